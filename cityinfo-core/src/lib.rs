//! Core domain types for the CityInfo service.
//!
//! Cities own an ordered collection of points of interest. All reads and
//! writes go through the [`CityRepository`] trait; mutations accumulate in a
//! [`UnitOfWork`] and only reach the aggregate store when the batch is saved.
//! The validation policy and the patch engine operate on candidate values,
//! never on stored entities.

#![forbid(unsafe_code)]

mod city;
mod patch;
mod repository;
mod store;
mod validate;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use city::{City, CityId, DESCRIPTION_MAX_LEN, NAME_MAX_LEN, PoiId, PointOfInterest};
pub use patch::{PatchError, PatchOp, PoiPatch};
pub use repository::{CityRepository, PendingOp, PoiDraft, StoreError, UnitOfWork};
pub use store::MemoryStore;
pub use validate::{FieldErrors, validate_poi};

#[cfg(feature = "store-sqlite")]
pub use store::sqlite::SqliteStore;
