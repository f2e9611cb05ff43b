//! SQLite-backed aggregate store.
//!
//! The schema is created on open and the unit of work commits inside a
//! single SQLite transaction, so a failing operation rolls the whole batch
//! back. Identity assignment stays in-process: counters are seeded from the
//! highest persisted ids, which keeps ids handed out before a save unique.

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use rusqlite::{Connection, OptionalExtension, params};

use crate::city::{City, CityId, PoiId, PointOfInterest};
use crate::repository::{CityRepository, PendingOp, PoiDraft, StoreError, UnitOfWork};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS cities (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT
    );
    CREATE TABLE IF NOT EXISTS points_of_interest (
        id INTEGER PRIMARY KEY,
        city_id INTEGER NOT NULL REFERENCES cities(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        description TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_points_of_interest_city
        ON points_of_interest(city_id);
";

/// Aggregate store persisted in a SQLite database.
///
/// Connection access is serialized behind a mutex; isolation across a commit
/// is delegated to SQLite's own transaction semantics.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
    next_city_id: AtomicU64,
    next_poi_id: AtomicU64,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open a private in-memory store, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        let max_city_id: u64 =
            conn.query_row("SELECT COALESCE(MAX(id), 0) FROM cities", [], |row| {
                row.get(0)
            })?;
        let max_poi_id: u64 = conn.query_row(
            "SELECT COALESCE(MAX(id), 0) FROM points_of_interest",
            [],
            |row| row.get(0),
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            next_city_id: AtomicU64::new(max_city_id),
            next_poi_id: AtomicU64::new(max_poi_id),
        })
    }

    /// Create a city, assigning it the next free id.
    pub fn insert_city(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<City, StoreError> {
        let id = CityId(self.next_city_id.fetch_add(1, Ordering::Relaxed) + 1);
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "INSERT INTO cities (id, name, description) VALUES (?1, ?2, ?3)",
            params![id.0, name, description],
        )?;
        Ok(City::new(id, name, description))
    }
}

fn poi_from_row(row: &rusqlite::Row<'_>) -> Result<PointOfInterest, rusqlite::Error> {
    Ok(PointOfInterest {
        id: PoiId(row.get(0)?),
        city_id: CityId(row.get(1)?),
        name: row.get(2)?,
        description: row.get(3)?,
    })
}

fn pois_for_city(conn: &Connection, city_id: CityId) -> Result<Vec<PointOfInterest>, StoreError> {
    let mut statement = conn.prepare(
        "SELECT id, city_id, name, description FROM points_of_interest
         WHERE city_id = ?1 ORDER BY id",
    )?;
    let rows = statement.query_map([city_id.0], poi_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

impl CityRepository for SqliteStore {
    fn city_exists(&self, city_id: CityId) -> Result<bool, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM cities WHERE id = ?1)",
            [city_id.0],
            |row| row.get(0),
        )?)
    }

    fn cities(&self) -> Result<Vec<City>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut statement =
            conn.prepare("SELECT id, name, description FROM cities ORDER BY id")?;
        let rows = statement.query_map([], |row| {
            let id: u64 = row.get(0)?;
            let name: String = row.get(1)?;
            let description: Option<String> = row.get(2)?;
            Ok(City::new(CityId(id), name, description.as_deref()))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn city(
        &self,
        city_id: CityId,
        include_points_of_interest: bool,
    ) -> Result<Option<City>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let city = conn
            .query_row(
                "SELECT id, name, description FROM cities WHERE id = ?1",
                [city_id.0],
                |row| {
                    let id: u64 = row.get(0)?;
                    let name: String = row.get(1)?;
                    let description: Option<String> = row.get(2)?;
                    Ok(City::new(CityId(id), name, description.as_deref()))
                },
            )
            .optional()?;
        let Some(mut city) = city else {
            return Ok(None);
        };
        if include_points_of_interest {
            city.points_of_interest = pois_for_city(&conn, city_id)?;
        }
        Ok(Some(city))
    }

    fn points_of_interest_for_city(
        &self,
        city_id: CityId,
    ) -> Result<Vec<PointOfInterest>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        pois_for_city(&conn, city_id)
    }

    fn point_of_interest_for_city(
        &self,
        city_id: CityId,
        poi_id: PoiId,
    ) -> Result<Option<PointOfInterest>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        // The city scope is part of the predicate, so an id owned by another
        // city resolves to nothing here.
        Ok(conn
            .query_row(
                "SELECT id, city_id, name, description FROM points_of_interest
                 WHERE id = ?1 AND city_id = ?2",
                params![poi_id.0, city_id.0],
                poi_from_row,
            )
            .optional()?)
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
        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let tx = conn.transaction()?;
        for op in uow.into_ops() {
            // An early return drops the open transaction, which rolls the
            // batch back.
            match op {
                PendingOp::Insert(poi) => {
                    let city_known: bool = tx.query_row(
                        "SELECT EXISTS(SELECT 1 FROM cities WHERE id = ?1)",
                        [poi.city_id.0],
                        |row| row.get(0),
                    )?;
                    if !city_known {
                        return Err(StoreError::UnknownCity(poi.city_id));
                    }
                    tx.execute(
                        "INSERT INTO points_of_interest (id, city_id, name, description)
                         VALUES (?1, ?2, ?3, ?4)",
                        params![poi.id.0, poi.city_id.0, poi.name, poi.description],
                    )?;
                }
                PendingOp::Update(poi) => {
                    let affected = tx.execute(
                        "UPDATE points_of_interest SET name = ?1, description = ?2
                         WHERE id = ?3 AND city_id = ?4",
                        params![poi.name, poi.description, poi.id.0, poi.city_id.0],
                    )?;
                    if affected == 0 {
                        return Err(StoreError::UnknownPointOfInterest(poi.id));
                    }
                }
                PendingOp::Delete(poi_id) => {
                    let affected = tx.execute(
                        "DELETE FROM points_of_interest WHERE id = ?1",
                        [poi_id.0],
                    )?;
                    if affected == 0 {
                        return Err(StoreError::UnknownPointOfInterest(poi_id));
                    }
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}
