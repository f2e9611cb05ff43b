//! Wire representations and the explicit conversions onto domain types.
//!
//! Every mapping is a small pure function per direction; nothing is derived
//! from reflection or shared field names. Input DTOs bind leniently (an
//! absent `name` becomes an empty string) so the validation policy, not the
//! deserializer, reports missing required fields with field-level detail.

use cityinfo_core::{City, PoiDraft, PointOfInterest};
use serde::{Deserialize, Serialize};

/// Outbound point of interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfInterestDto {
    /// Store-assigned identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Optional description, `null` when absent.
    pub description: Option<String>,
}

/// Inbound create/update body for a point of interest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfInterestInput {
    /// Display name; validation rejects the empty/absent case.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

impl PointOfInterestInput {
    /// The candidate name, empty when the field was absent or `null`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Outbound city including its owned points of interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityDto {
    /// Store-assigned identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Convenience count mirroring `points_of_interest.len()`.
    pub number_of_points_of_interest: usize,
    /// Owned points of interest.
    pub points_of_interest: Vec<PointOfInterestDto>,
}

/// Outbound city without its POI collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySummaryDto {
    /// Store-assigned identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Project a stored POI onto the wire shape.
#[must_use]
pub fn poi_to_dto(poi: &PointOfInterest) -> PointOfInterestDto {
    PointOfInterestDto {
        id: poi.id.0,
        name: poi.name.clone(),
        description: poi.description.clone(),
    }
}

/// Project a city including its POIs onto the wire shape.
#[must_use]
pub fn city_to_dto(city: &City) -> CityDto {
    CityDto {
        id: city.id.0,
        name: city.name.clone(),
        description: city.description.clone(),
        number_of_points_of_interest: city.points_of_interest.len(),
        points_of_interest: city.points_of_interest.iter().map(poi_to_dto).collect(),
    }
}

/// Project a city without its POIs onto the wire shape.
#[must_use]
pub fn city_to_summary_dto(city: &City) -> CitySummaryDto {
    CitySummaryDto {
        id: city.id.0,
        name: city.name.clone(),
        description: city.description.clone(),
    }
}

/// Turn a validated input body into an identity-less draft.
#[must_use]
pub fn draft_from_input(input: &PointOfInterestInput) -> PoiDraft {
    PoiDraft {
        name: input.name().to_owned(),
        description: input.description.clone(),
    }
}
