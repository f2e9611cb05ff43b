//! Test-only helpers: a pre-seeded in-memory store shared by unit and
//! integration tests.

use crate::repository::{CityRepository, PoiDraft, UnitOfWork};
use crate::store::MemoryStore;

/// Build a [`MemoryStore`] seeded with two cities and three POIs.
///
/// City 1 ("New York City") owns "Ferry" (id 1, "Scenic ferry ride") and
/// "Central Park" (id 2); city 2 ("Antwerp") owns "Cathedral of Our Lady"
/// (id 3). Ids are deterministic because the store assigns them in order.
///
/// # Panics
///
/// Panics if seeding the fresh store fails, which only happens when the
/// store itself is broken.
#[must_use]
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    let new_york = store
        .insert_city("New York City", Some("The one with that big park"))
        .expect("seed city");
    let antwerp = store
        .insert_city("Antwerp", Some("The one with the cathedral that was never finished"))
        .expect("seed city");

    let mut uow = UnitOfWork::new();
    store.add_point_of_interest_for_city(
        &mut uow,
        new_york.id,
        draft("Ferry", Some("Scenic ferry ride")),
    );
    store.add_point_of_interest_for_city(
        &mut uow,
        new_york.id,
        draft("Central Park", Some("The most visited urban park in the United States")),
    );
    store.add_point_of_interest_for_city(
        &mut uow,
        antwerp.id,
        draft("Cathedral of Our Lady", Some("A Gothic style cathedral")),
    );
    store.save(uow).expect("seed save");
    store
}

fn draft(name: &str, description: Option<&str>) -> PoiDraft {
    PoiDraft {
        name: name.to_owned(),
        description: description.map(str::to_owned),
    }
}
