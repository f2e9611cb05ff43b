//! City and point-of-interest aggregate types.
//!
//! A [`City`] owns its points of interest: a POI lives and dies with its
//! parent city and never moves between cities. Identifiers are assigned by
//! the aggregate store and are immutable afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length of a city or POI name, in characters.
pub const NAME_MAX_LEN: usize = 50;

/// Maximum length of a description, in characters.
pub const DESCRIPTION_MAX_LEN: usize = 200;

/// Identifier of a [`City`], unique across the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct CityId(pub u64);

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a [`PointOfInterest`], unique across the whole store, not
/// merely within its parent city.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct PoiId(pub u64);

impl fmt::Display for PoiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A city together with its owned points of interest.
///
/// # Examples
///
/// ```
/// use cityinfo_core::{City, CityId};
///
/// let city = City::new(CityId(1), "Antwerp", Some("Diamond capital"));
/// assert_eq!(city.id, CityId(1));
/// assert!(city.points_of_interest.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// Unique identifier, assigned by the store on creation.
    pub id: CityId,
    /// Required display name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Points of interest owned by this city, ordered by insertion.
    pub points_of_interest: Vec<PointOfInterest>,
}

impl City {
    /// Construct a city with an empty POI collection.
    pub fn new(id: CityId, name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.map(str::to_owned),
            points_of_interest: Vec::new(),
        }
    }

    /// Find an owned point of interest by id.
    #[must_use]
    pub fn point_of_interest(&self, poi_id: PoiId) -> Option<&PointOfInterest> {
        self.points_of_interest.iter().find(|p| p.id == poi_id)
    }
}

/// A single location of interest within a city.
///
/// Whether `description` may equal `name` is a policy question answered at
/// the validation boundary, not a structural property of this type.
///
/// # Examples
///
/// ```
/// use cityinfo_core::{CityId, PoiId, PointOfInterest};
///
/// let poi = PointOfInterest::new(PoiId(1), CityId(1), "Central Park", None);
/// assert_eq!(poi.city_id, CityId(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointOfInterest {
    /// Unique identifier, assigned by the store on creation.
    pub id: PoiId,
    /// Parent city; immutable after creation.
    pub city_id: CityId,
    /// Required display name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
}

impl PointOfInterest {
    /// Construct a point of interest owned by the given city.
    pub fn new(
        id: PoiId,
        city_id: CityId,
        name: impl Into<String>,
        description: Option<&str>,
    ) -> Self {
        Self {
            id,
            city_id,
            name: name.into(),
            description: description.map(str::to_owned),
        }
    }
}
