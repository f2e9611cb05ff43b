//! Validation policy for candidate point-of-interest states.
//!
//! The same pure rules run whether the candidate came from a create body, a
//! full update, or the patch engine, so all three flows reject exactly the
//! same inputs. Errors accumulate into a field-to-messages map instead of
//! short-circuiting on the first violation.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::city::{DESCRIPTION_MAX_LEN, NAME_MAX_LEN};

/// Field-level validation outcome: a map from field name to messages.
///
/// An empty map means the candidate passed. Serializes as a JSON object so
/// callers can return it verbatim in a 400 payload.
///
/// # Examples
///
/// ```
/// use cityinfo_core::validate_poi;
///
/// let errors = validate_poi("Ferry", Some("Ferry"));
/// assert_eq!(errors.messages("description").len(), 1);
/// assert!(validate_poi("Ferry", Some("Scenic ferry ride")).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Create an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no rule was violated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Record a message against a field.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_owned()).or_default().push(message.into());
    }

    /// Messages recorded against a field, empty when the field is clean.
    #[must_use]
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }
}

/// Evaluate the validation policy against a candidate POI state.
///
/// Structural rules run first (`name` required and at most
/// [`NAME_MAX_LEN`] characters, `description` at most
/// [`DESCRIPTION_MAX_LEN`]), then the business rule that the description
/// must differ from the name. The business violation is tagged to the
/// `description` field and accumulated rather than thrown, so a caller sees
/// every problem in one pass.
#[must_use]
pub fn validate_poi(name: &str, description: Option<&str>) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if name.is_empty() {
        errors.push("name", "The name field is required");
    } else if name.chars().count() > NAME_MAX_LEN {
        errors.push(
            "name",
            format!("The name must be at most {NAME_MAX_LEN} characters long"),
        );
    }

    if let Some(description) = description {
        if description.chars().count() > DESCRIPTION_MAX_LEN {
            errors.push(
                "description",
                format!("The description must be at most {DESCRIPTION_MAX_LEN} characters long"),
            );
        }
        // Case-sensitive, exact comparison.
        if description == name {
            errors.push(
                "description",
                "The provided description must be different from the name",
            );
        }
    }

    errors
}
