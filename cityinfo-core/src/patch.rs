//! Patch engine for partial point-of-interest updates.
//!
//! A patch document is an ordered list of tagged operations in the JSON
//! Patch shape. Operations are interpreted against a transient copy of the
//! patchable fields (`name` and `description` only); the stored entity is
//! untouched until the caller validates the candidate and commits it. The
//! first failing operation aborts the whole document, so a partially patched
//! candidate is never observable.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::city::PointOfInterest;

/// A single partial-update operation targeting a named field.
///
/// Deserializes from the JSON Patch wire shape, e.g.
/// `{"op": "replace", "path": "/description", "value": "Fast ferry"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    /// Set a field, creating it when absent.
    Add {
        /// Target field pointer.
        path: String,
        /// Replacement value; must be a JSON string.
        value: Value,
    },
    /// Clear a field; the target must currently hold a value.
    Remove {
        /// Target field pointer.
        path: String,
    },
    /// Overwrite a field. Both patchable fields always exist on the
    /// projection, so this succeeds even when `description` is currently
    /// null.
    Replace {
        /// Target field pointer.
        path: String,
        /// Replacement value; must be a JSON string.
        value: Value,
    },
    /// Move a value from one field to another.
    Move {
        /// Source field pointer; cleared on success.
        from: String,
        /// Target field pointer.
        path: String,
    },
    /// Copy a value from one field to another; a null `description` copies
    /// as null.
    Copy {
        /// Source field pointer; left untouched.
        from: String,
        /// Target field pointer.
        path: String,
    },
    /// Assert that a field currently holds the given value.
    Test {
        /// Target field pointer.
        path: String,
        /// Expected value; must be a JSON string.
        value: Value,
    },
}

/// Reason a patch document failed to apply.
///
/// Every variant is a structural fault of the document itself, reported to
/// clients as a 400-class validation failure rather than swallowed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    /// The pointer does not name a patchable field. `id` and `city_id` are
    /// deliberately unaddressable.
    #[error("path {path:?} does not name a patchable field")]
    UnknownPath {
        /// Offending pointer as sent by the client.
        path: String,
    },
    /// The operation carried a non-string value.
    #[error("operation on {path:?} requires a string value")]
    InvalidValue {
        /// Target pointer of the offending operation.
        path: String,
    },
    /// `remove` or `move` addressed a field that holds no value.
    #[error("no value exists at {path:?}")]
    MissingValue {
        /// Pointer of the absent field.
        path: String,
    },
    /// The document tried to remove the required `name` field.
    #[error("the name field is required and cannot be removed")]
    NameRemoved,
    /// A `test` operation did not match the current value.
    #[error("test failed at {path:?}")]
    TestFailed {
        /// Pointer of the mismatched field.
        path: String,
    },
}

/// The patchable projection of a [`PointOfInterest`].
///
/// # Examples
///
/// ```
/// use cityinfo_core::{CityId, PatchOp, PoiId, PoiPatch, PointOfInterest};
/// use serde_json::json;
///
/// let poi = PointOfInterest::new(PoiId(1), CityId(1), "Ferry", Some("Scenic ferry ride"));
/// let ops = vec![PatchOp::Replace {
///     path: "/description".into(),
///     value: json!("Fast ferry"),
/// }];
///
/// let candidate = PoiPatch::from_poi(&poi).apply(&ops)?;
/// assert_eq!(candidate.description.as_deref(), Some("Fast ferry"));
/// # Ok::<(), cityinfo_core::PatchError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoiPatch {
    /// Candidate name.
    pub name: String,
    /// Candidate description.
    pub description: Option<String>,
}

/// Fields addressable by a patch pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Description,
}

impl Field {
    fn resolve(path: &str) -> Result<Self, PatchError> {
        match path {
            "/name" => Ok(Self::Name),
            "/description" => Ok(Self::Description),
            _ => Err(PatchError::UnknownPath {
                path: path.to_owned(),
            }),
        }
    }
}

fn string_value(path: &str, value: &Value) -> Result<String, PatchError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| PatchError::InvalidValue {
            path: path.to_owned(),
        })
}

impl PoiPatch {
    /// Project the patchable fields out of a stored entity.
    #[must_use]
    pub fn from_poi(poi: &PointOfInterest) -> Self {
        Self {
            name: poi.name.clone(),
            description: poi.description.clone(),
        }
    }

    /// Apply an ordered operation sequence, yielding the candidate state.
    ///
    /// Consumes the scratch copy; on error the caller still holds the
    /// untouched entity, so failure is atomic from its point of view. A
    /// document that recreates the current state is reported as success and
    /// left for the caller to validate and save like any other candidate.
    pub fn apply(mut self, ops: &[PatchOp]) -> Result<Self, PatchError> {
        for op in ops {
            self.step(op)?;
        }
        Ok(self)
    }

    fn step(&mut self, op: &PatchOp) -> Result<(), PatchError> {
        match op {
            // Both fields always exist on the projection, so add and
            // replace coincide: they overwrite whatever is there, including
            // a null description.
            PatchOp::Add { path, value } | PatchOp::Replace { path, value } => {
                let field = Field::resolve(path)?;
                self.set(field, Some(string_value(path, value)?))
            }
            PatchOp::Remove { path } => {
                let field = Field::resolve(path)?;
                self.require(field, path)?;
                self.set(field, None)
            }
            PatchOp::Move { from, path } => {
                let source = Field::resolve(from)?;
                let target = Field::resolve(path)?;
                let value = self.require(source, from)?;
                self.set(source, None)?;
                self.set(target, Some(value))
            }
            PatchOp::Copy { from, path } => {
                let source = Field::resolve(from)?;
                let target = Field::resolve(path)?;
                let value = self.get(source).map(str::to_owned);
                self.set(target, value)
            }
            PatchOp::Test { path, value } => {
                let field = Field::resolve(path)?;
                let expected = string_value(path, value)?;
                if self.get(field) == Some(expected.as_str()) {
                    Ok(())
                } else {
                    Err(PatchError::TestFailed {
                        path: path.to_owned(),
                    })
                }
            }
        }
    }

    fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => Some(self.name.as_str()),
            Field::Description => self.description.as_deref(),
        }
    }

    fn require(&self, field: Field, path: &str) -> Result<String, PatchError> {
        self.get(field)
            .map(str::to_owned)
            .ok_or_else(|| PatchError::MissingValue {
                path: path.to_owned(),
            })
    }

    fn set(&mut self, field: Field, value: Option<String>) -> Result<(), PatchError> {
        match (field, value) {
            (Field::Name, Some(value)) => {
                self.name = value;
                Ok(())
            }
            // A document without a name is unrepresentable.
            (Field::Name, None) => Err(PatchError::NameRemoved),
            (Field::Description, value) => {
                self.description = value;
                Ok(())
            }
        }
    }
}
