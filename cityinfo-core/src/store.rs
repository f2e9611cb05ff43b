//! Aggregate stores backing the [`CityRepository`] trait.
//!
//! [`MemoryStore`] keeps the whole aggregate behind a read-write lock and is
//! the default backend; the SQLite store lives in [`sqlite`] behind the
//! `store-sqlite` feature. Both assign identities themselves and commit a
//! unit of work as one atomic batch.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::city::{City, CityId, PoiId, PointOfInterest};
use crate::repository::{CityRepository, PendingOp, PoiDraft, StoreError, UnitOfWork};

#[cfg(feature = "store-sqlite")]
pub(crate) mod sqlite;

/// In-memory aggregate store.
///
/// Reads take the shared lock and may observe the state from before a commit
/// that is in flight; a commit stages the whole batch against a copy of the
/// aggregate and swaps it in, so readers never see a torn batch.
///
/// # Examples
///
/// ```
/// use cityinfo_core::{CityRepository, MemoryStore, PoiDraft, UnitOfWork};
///
/// # fn main() -> Result<(), cityinfo_core::StoreError> {
/// let store = MemoryStore::new();
/// let city = store.insert_city("Antwerp", None)?;
///
/// let mut uow = UnitOfWork::new();
/// let poi = store.add_point_of_interest_for_city(
///     &mut uow,
///     city.id,
///     PoiDraft { name: "Cathedral".into(), description: None },
/// );
/// store.save(uow)?;
///
/// assert_eq!(store.point_of_interest_for_city(city.id, poi.id)?, Some(poi));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    cities: RwLock<BTreeMap<CityId, City>>,
    next_city_id: AtomicU64,
    next_poi_id: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a city, assigning it the next free id.
    ///
    /// City creation sits on the store rather than the repository trait:
    /// the HTTP surface only mutates points of interest, and cities enter
    /// the system through seeding or fixtures.
    pub fn insert_city(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<City, StoreError> {
        let id = CityId(self.next_city_id.fetch_add(1, Ordering::Relaxed) + 1);
        let city = City::new(id, name, description);
        let mut cities = self.cities.write().map_err(|_| StoreError::Poisoned)?;
        cities.insert(id, city.clone());
        Ok(city)
    }
}

impl CityRepository for MemoryStore {
    fn city_exists(&self, city_id: CityId) -> Result<bool, StoreError> {
        let cities = self.cities.read().map_err(|_| StoreError::Poisoned)?;
        Ok(cities.contains_key(&city_id))
    }

    fn cities(&self) -> Result<Vec<City>, StoreError> {
        let cities = self.cities.read().map_err(|_| StoreError::Poisoned)?;
        Ok(cities
            .values()
            .map(|city| City::new(city.id, city.name.as_str(), city.description.as_deref()))
            .collect())
    }

    fn city(
        &self,
        city_id: CityId,
        include_points_of_interest: bool,
    ) -> Result<Option<City>, StoreError> {
        let cities = self.cities.read().map_err(|_| StoreError::Poisoned)?;
        Ok(cities.get(&city_id).map(|city| {
            if include_points_of_interest {
                city.clone()
            } else {
                City::new(city.id, city.name.as_str(), city.description.as_deref())
            }
        }))
    }

    fn points_of_interest_for_city(
        &self,
        city_id: CityId,
    ) -> Result<Vec<PointOfInterest>, StoreError> {
        let cities = self.cities.read().map_err(|_| StoreError::Poisoned)?;
        Ok(cities
            .get(&city_id)
            .map(|city| city.points_of_interest.clone())
            .unwrap_or_default())
    }

    fn point_of_interest_for_city(
        &self,
        city_id: CityId,
        poi_id: PoiId,
    ) -> Result<Option<PointOfInterest>, StoreError> {
        let cities = self.cities.read().map_err(|_| StoreError::Poisoned)?;
        // Scoping through the parent city means an id that resolves under a
        // different city stays invisible here.
        Ok(cities
            .get(&city_id)
            .and_then(|city| city.point_of_interest(poi_id))
            .cloned())
    }

    fn add_point_of_interest_for_city(
        &self,
        uow: &mut UnitOfWork,
        city_id: CityId,
        draft: PoiDraft,
    ) -> PointOfInterest {
        let id = PoiId(self.next_poi_id.fetch_add(1, Ordering::Relaxed) + 1);
        let poi = PointOfInterest::new(id, city_id, draft.name, draft.description.as_deref());
        uow.insert(poi.clone());
        poi
    }

    fn save(&self, uow: UnitOfWork) -> Result<(), StoreError> {
        let mut cities = self.cities.write().map_err(|_| StoreError::Poisoned)?;
        // Stage the batch against a copy so a mid-batch failure leaves the
        // published aggregate untouched.
        let mut staged = cities.clone();
        for op in uow.into_ops() {
            apply_op(&mut staged, op)?;
        }
        *cities = staged;
        Ok(())
    }
}

fn apply_op(cities: &mut BTreeMap<CityId, City>, op: PendingOp) -> Result<(), StoreError> {
    match op {
        PendingOp::Insert(poi) => {
            let city = cities
                .get_mut(&poi.city_id)
                .ok_or(StoreError::UnknownCity(poi.city_id))?;
            city.points_of_interest.push(poi);
            Ok(())
        }
        PendingOp::Update(poi) => {
            let slot = cities
                .get_mut(&poi.city_id)
                .and_then(|city| {
                    city.points_of_interest
                        .iter_mut()
                        .find(|stored| stored.id == poi.id)
                })
                .ok_or(StoreError::UnknownPointOfInterest(poi.id))?;
            *slot = poi;
            Ok(())
        }
        PendingOp::Delete(poi_id) => {
            for city in cities.values_mut() {
                if let Some(index) = city
                    .points_of_interest
                    .iter()
                    .position(|stored| stored.id == poi_id)
                {
                    city.points_of_interest.remove(index);
                    return Ok(());
                }
            }
            Err(StoreError::UnknownPointOfInterest(poi_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn draft(name: &str, description: Option<&str>) -> PoiDraft {
        PoiDraft {
            name: name.to_owned(),
            description: description.map(str::to_owned),
        }
    }

    #[fixture]
    fn seeded() -> (MemoryStore, City, PointOfInterest) {
        let store = MemoryStore::new();
        let city = store.insert_city("Antwerp", Some("Diamond capital")).expect("insert city");
        let mut uow = UnitOfWork::new();
        let poi = store.add_point_of_interest_for_city(
            &mut uow,
            city.id,
            draft("Cathedral", Some("Gothic cathedral")),
        );
        store.save(uow).expect("seed save");
        (store, city, poi)
    }

    #[rstest]
    fn city_exists_is_false_for_unknown_id() {
        let store = MemoryStore::new();
        assert!(!store.city_exists(CityId(42)).expect("existence check"));
    }

    #[rstest]
    fn insert_city_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let first = store.insert_city("Antwerp", None).expect("insert");
        let second = store.insert_city("Paris", None).expect("insert");
        assert!(second.id > first.id);
        assert!(store.city_exists(first.id).expect("existence check"));
    }

    #[rstest]
    fn cities_listing_omits_poi_collections(seeded: (MemoryStore, City, PointOfInterest)) {
        let (store, city, _) = seeded;
        let listed = store.cities().expect("list cities");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, city.id);
        assert!(listed[0].points_of_interest.is_empty());
    }

    #[rstest]
    fn city_lookup_honours_include_flag(seeded: (MemoryStore, City, PointOfInterest)) {
        let (store, city, poi) = seeded;
        let bare = store.city(city.id, false).expect("lookup").expect("city");
        assert!(bare.points_of_interest.is_empty());
        let full = store.city(city.id, true).expect("lookup").expect("city");
        assert_eq!(full.points_of_interest, vec![poi]);
    }

    #[rstest]
    fn add_is_invisible_until_saved() {
        let store = MemoryStore::new();
        let city = store.insert_city("Antwerp", None).expect("insert city");
        let mut uow = UnitOfWork::new();
        let poi =
            store.add_point_of_interest_for_city(&mut uow, city.id, draft("Cathedral", None));

        assert_eq!(
            store
                .point_of_interest_for_city(city.id, poi.id)
                .expect("lookup"),
            None
        );
        store.save(uow).expect("save");
        assert!(
            store
                .point_of_interest_for_city(city.id, poi.id)
                .expect("lookup")
                .is_some()
        );
    }

    #[rstest]
    fn poi_ids_are_unique_across_cities() {
        let store = MemoryStore::new();
        let antwerp = store.insert_city("Antwerp", None).expect("insert city");
        let paris = store.insert_city("Paris", None).expect("insert city");

        let mut uow = UnitOfWork::new();
        let first =
            store.add_point_of_interest_for_city(&mut uow, antwerp.id, draft("Cathedral", None));
        let second =
            store.add_point_of_interest_for_city(&mut uow, paris.id, draft("Louvre", None));
        store.save(uow).expect("save");

        assert_ne!(first.id, second.id);
    }

    #[rstest]
    fn poi_lookup_does_not_leak_across_cities(seeded: (MemoryStore, City, PointOfInterest)) {
        let (store, _, poi) = seeded;
        let paris = store.insert_city("Paris", None).expect("insert city");
        assert_eq!(
            store
                .point_of_interest_for_city(paris.id, poi.id)
                .expect("lookup"),
            None
        );
    }

    #[rstest]
    fn pois_for_absent_city_is_empty() {
        let store = MemoryStore::new();
        assert!(
            store
                .points_of_interest_for_city(CityId(9))
                .expect("listing")
                .is_empty()
        );
    }

    #[rstest]
    fn update_overwrites_stored_poi(seeded: (MemoryStore, City, PointOfInterest)) {
        let (store, city, mut poi) = seeded;
        poi.description = Some("Restored facade".into());
        let mut uow = UnitOfWork::new();
        uow.update(poi.clone());
        store.save(uow).expect("save");

        let stored = store
            .point_of_interest_for_city(city.id, poi.id)
            .expect("lookup")
            .expect("poi");
        assert_eq!(stored.description.as_deref(), Some("Restored facade"));
    }

    #[rstest]
    fn delete_removes_stored_poi(seeded: (MemoryStore, City, PointOfInterest)) {
        let (store, city, poi) = seeded;
        let mut uow = UnitOfWork::new();
        uow.delete(&poi);
        store.save(uow).expect("save");

        assert_eq!(
            store
                .point_of_interest_for_city(city.id, poi.id)
                .expect("lookup"),
            None
        );
    }

    #[rstest]
    fn insert_for_unknown_city_fails_the_batch() {
        let store = MemoryStore::new();
        let mut uow = UnitOfWork::new();
        store.add_point_of_interest_for_city(&mut uow, CityId(99), draft("Ghost", None));
        let err = store.save(uow).expect_err("commit must fail");
        assert!(matches!(err, StoreError::UnknownCity(CityId(99))));
    }

    #[rstest]
    fn failed_batch_leaves_prior_state_intact(seeded: (MemoryStore, City, PointOfInterest)) {
        let (store, city, mut poi) = seeded;
        let original = poi.clone();
        poi.name = "Renamed".into();

        let mut uow = UnitOfWork::new();
        uow.update(poi);
        uow.delete(&PointOfInterest::new(PoiId(404), city.id, "Ghost", None));
        let err = store.save(uow).expect_err("commit must fail");
        assert!(matches!(err, StoreError::UnknownPointOfInterest(PoiId(404))));

        // The valid update earlier in the batch must not have been applied.
        let stored = store
            .point_of_interest_for_city(city.id, original.id)
            .expect("lookup")
            .expect("poi");
        assert_eq!(stored, original);
    }

    #[rstest]
    fn empty_batch_commits_as_noop(seeded: (MemoryStore, City, PointOfInterest)) {
        let (store, _, _) = seeded;
        store.save(UnitOfWork::new()).expect("empty save");
    }
}
