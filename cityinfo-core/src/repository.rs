//! Repository abstraction over the city aggregate store.
//!
//! All reads and writes to cities and their points of interest go through
//! [`CityRepository`]. Mutating calls never touch persisted state directly:
//! they record [`PendingOp`]s in a [`UnitOfWork`], and the whole batch is
//! committed atomically by [`CityRepository::save`]. A failed save leaves the
//! previously persisted state intact.

use thiserror::Error;

use crate::city::{City, CityId, PoiId, PointOfInterest};

/// Errors raised by an aggregate store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A pending insert referenced a city that is not in the store.
    #[error("city {0} does not exist")]
    UnknownCity(CityId),
    /// A pending update or delete referenced a POI that is not in the store.
    #[error("point of interest {0} does not exist")]
    UnknownPointOfInterest(PoiId),
    /// A concurrent writer panicked while holding the store lock.
    #[error("aggregate store lock poisoned")]
    Poisoned,
    /// The SQLite backend reported a failure.
    #[cfg(feature = "store-sqlite")]
    #[error("database error: {source}")]
    Database {
        /// Source error raised by the SQLite driver.
        #[from]
        source: rusqlite::Error,
    },
}

/// Input for a point of interest that does not yet have an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoiDraft {
    /// Required display name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
}

/// A single mutation awaiting commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingOp {
    /// Append a freshly identified POI to its city's collection.
    Insert(PointOfInterest),
    /// Overwrite the stored POI carrying the same id.
    Update(PointOfInterest),
    /// Remove the POI with this id from whichever city owns it.
    Delete(PoiId),
}

/// An ordered batch of pending mutations, committed as a single unit.
///
/// The unit of work is a plain value: dropping it discards the batch, and
/// nothing becomes visible to readers until [`CityRepository::save`] accepts
/// it. An empty batch commits as a no-op.
///
/// # Examples
///
/// ```
/// use cityinfo_core::{CityId, PoiId, PointOfInterest, UnitOfWork};
///
/// let poi = PointOfInterest::new(PoiId(1), CityId(1), "Ferry", None);
/// let mut uow = UnitOfWork::new();
/// uow.update(poi.clone());
/// uow.delete(&poi);
/// assert_eq!(uow.ops().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct UnitOfWork {
    ops: Vec<PendingOp>,
}

impl UnitOfWork {
    /// Start an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an insert. Store implementations call this from
    /// [`CityRepository::add_point_of_interest_for_city`] once an id has
    /// been assigned; callers go through that method instead.
    pub fn insert(&mut self, poi: PointOfInterest) {
        self.ops.push(PendingOp::Insert(poi));
    }

    /// Record a full overwrite of a stored POI.
    pub fn update(&mut self, poi: PointOfInterest) {
        self.ops.push(PendingOp::Update(poi));
    }

    /// Mark a POI for removal.
    pub fn delete(&mut self, poi: &PointOfInterest) {
        self.ops.push(PendingOp::Delete(poi.id));
    }

    /// True when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The recorded operations, in order.
    #[must_use]
    pub fn ops(&self) -> &[PendingOp] {
        &self.ops
    }

    /// Consume the batch for commit.
    #[must_use]
    pub fn into_ops(self) -> Vec<PendingOp> {
        self.ops
    }
}

/// The sole mutation and query surface over the city aggregate store.
///
/// Implementations must be safe to share across request workers: reads may
/// run concurrently with a commit and observe the state from before it, but
/// never a torn batch. The trait is synchronous; async callers wrap it in
/// their own executor discipline.
pub trait CityRepository: Send + Sync {
    /// Whether a city with this id exists. Unknown ids yield `false`, never
    /// an error.
    fn city_exists(&self, city_id: CityId) -> Result<bool, StoreError>;

    /// All cities ordered by id, with their POI collections left empty.
    fn cities(&self) -> Result<Vec<City>, StoreError>;

    /// A single city; `include_points_of_interest` controls whether the
    /// owned collection is populated.
    fn city(
        &self,
        city_id: CityId,
        include_points_of_interest: bool,
    ) -> Result<Option<City>, StoreError>;

    /// The POIs owned by a city; empty when the city is absent or bare.
    fn points_of_interest_for_city(
        &self,
        city_id: CityId,
    ) -> Result<Vec<PointOfInterest>, StoreError>;

    /// A single POI scoped to its parent city. Yields `None` when either id
    /// is unknown or the POI belongs to a different city.
    fn point_of_interest_for_city(
        &self,
        city_id: CityId,
        poi_id: PoiId,
    ) -> Result<Option<PointOfInterest>, StoreError>;

    /// Assign a fresh store-wide unique id to the draft, stamp its parent
    /// city, and record the insert in the unit of work. Nothing is persisted
    /// until the batch is saved.
    fn add_point_of_interest_for_city(
        &self,
        uow: &mut UnitOfWork,
        city_id: CityId,
        draft: PoiDraft,
    ) -> PointOfInterest;

    /// Commit the batch atomically. On error no operation from the batch is
    /// visible and previously persisted state is unchanged.
    fn save(&self, uow: UnitOfWork) -> Result<(), StoreError>;
}
