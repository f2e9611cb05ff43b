//! Facade crate for the CityInfo resource service.
//!
//! This crate re-exports the core domain types, the repository abstraction,
//! and the optional SQLite aggregate store behind a feature flag. The HTTP
//! surface lives in the `cityinfo-server` binary crate.

#![forbid(unsafe_code)]

pub use cityinfo_core::{
    City, CityId, CityRepository, FieldErrors, MemoryStore, PatchError, PatchOp, PendingOp,
    PoiDraft, PoiId, PoiPatch, PointOfInterest, StoreError, UnitOfWork, validate_poi,
};

#[cfg(feature = "store-sqlite")]
pub use cityinfo_core::SqliteStore;
