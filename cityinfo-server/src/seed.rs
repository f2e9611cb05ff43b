//! Startup seeding for empty aggregate stores.
//!
//! Mirrors the demo dataset the service has always shipped with so a fresh
//! deployment answers queries immediately. Stores that already hold cities
//! are left untouched.

use cityinfo_core::{
    City, CityRepository, MemoryStore, PoiDraft, SqliteStore, StoreError, UnitOfWork,
};

/// A store that can create cities, which the repository trait deliberately
/// does not expose.
pub trait SeedableStore: CityRepository {
    /// Create a city with a store-assigned id.
    fn insert_city(&self, name: &str, description: Option<&str>) -> Result<City, StoreError>;
}

impl SeedableStore for MemoryStore {
    fn insert_city(&self, name: &str, description: Option<&str>) -> Result<City, StoreError> {
        MemoryStore::insert_city(self, name, description)
    }
}

impl SeedableStore for SqliteStore {
    fn insert_city(&self, name: &str, description: Option<&str>) -> Result<City, StoreError> {
        SqliteStore::insert_city(self, name, description)
    }
}

/// Seed the demo cities and POIs when the store is empty.
pub fn ensure_seed_data<S: SeedableStore>(store: &S) -> Result<(), StoreError> {
    if !store.cities()?.is_empty() {
        return Ok(());
    }

    let new_york = store.insert_city(
        "New York City",
        Some("The one with that big park"),
    )?;
    let antwerp = store.insert_city(
        "Antwerp",
        Some("The one with the cathedral that was never really finished"),
    )?;
    let paris = store.insert_city(
        "Paris",
        Some("The one with that big tower"),
    )?;

    let mut uow = UnitOfWork::new();
    for (city_id, name, description) in [
        (
            new_york.id,
            "Central Park",
            "The most visited urban park in the United States",
        ),
        (
            new_york.id,
            "Empire State Building",
            "A 102-story skyscraper located in Midtown Manhattan",
        ),
        (
            antwerp.id,
            "Cathedral of Our Lady",
            "A Gothic style cathedral, conceived by architects Jan and Pieter Appelmans",
        ),
        (
            antwerp.id,
            "Antwerp Central Station",
            "The finest example of railway architecture in Belgium",
        ),
        (
            paris.id,
            "Eiffel Tower",
            "A wrought iron lattice tower on the Champ de Mars",
        ),
        (
            paris.id,
            "The Louvre",
            "The world's largest museum",
        ),
    ] {
        store.add_point_of_interest_for_city(
            &mut uow,
            city_id,
            PoiDraft {
                name: name.to_owned(),
                description: Some(description.to_owned()),
            },
        );
    }
    store.save(uow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn seeds_an_empty_store_once() {
        let store = MemoryStore::new();
        ensure_seed_data(&store).expect("seed");
        let cities = store.cities().expect("list");
        assert_eq!(cities.len(), 3);

        // A second pass leaves the store as it is.
        ensure_seed_data(&store).expect("seed again");
        assert_eq!(store.cities().expect("list").len(), 3);
    }

    #[rstest]
    fn leaves_a_populated_store_untouched() {
        let store = MemoryStore::new();
        store.insert_city("Ghent", None).expect("insert city");
        ensure_seed_data(&store).expect("seed");
        let cities = store.cities().expect("list");
        assert_eq!(cities.len(), 1);
        assert_eq!(cities[0].name, "Ghent");
    }
}
