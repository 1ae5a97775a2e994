//! Whole-collection load and save.
//!
//! A [`Collection`] names a set of records of one type. [`Database::load`]
//! returns the records in stored order, seeding the collection first if it
//! was never written. [`Database::save`] replaces the whole collection in a
//! single transaction and bumps its version; [`Database::save_if_version`]
//! does the same only when nobody else saved in between.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{ChatMessage, Department, Testimonial, Thread, User};
use crate::seed;

/// Format tag written next to every collection.
pub const SCHEMA_VERSION: u32 = 1;

/// A record stored in a collection, keyed by its id.
pub trait Record: Serialize + DeserializeOwned + Clone {
    fn record_id(&self) -> &str;
}

/// A named collection of records with a seed set.
pub trait Collection {
    const NAME: &'static str;
    type Record: Record;

    /// Records written when the collection is first read.
    fn seed() -> Vec<Self::Record>;
}

/// Records of a collection together with the version they were read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub records: Vec<T>,
    pub version: u64,
}

pub struct Departments;
pub struct Users;
pub struct Testimonials;
pub struct Threads;
pub struct ChatMessages;

impl Collection for Departments {
    const NAME: &'static str = "departments";
    type Record = Department;

    fn seed() -> Vec<Department> {
        seed::departments()
    }
}

impl Collection for Users {
    const NAME: &'static str = "users";
    type Record = User;

    fn seed() -> Vec<User> {
        seed::users()
    }
}

impl Collection for Testimonials {
    const NAME: &'static str = "testimonials";
    type Record = Testimonial;

    fn seed() -> Vec<Testimonial> {
        seed::testimonials()
    }
}

impl Collection for Threads {
    const NAME: &'static str = "threads";
    type Record = Thread;

    fn seed() -> Vec<Thread> {
        seed::threads()
    }
}

impl Collection for ChatMessages {
    const NAME: &'static str = "chat_messages";
    type Record = ChatMessage;

    fn seed() -> Vec<ChatMessage> {
        seed::chat_messages()
    }
}

impl Record for Department {
    fn record_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Record for User {
    fn record_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Record for Testimonial {
    fn record_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Record for Thread {
    fn record_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Record for ChatMessage {
    fn record_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Database {
    /// Load every record of `C` in stored order.
    pub fn load<C: Collection>(&self) -> Result<Vec<C::Record>> {
        Ok(self.load_versioned::<C>()?.records)
    }

    /// Load every record of `C` along with the collection version.
    ///
    /// A collection that was never written, carries an unknown schema tag,
    /// or holds a record that fails to decode is replaced by its seed set.
    pub fn load_versioned<C: Collection>(&self) -> Result<Versioned<C::Record>> {
        let header: Option<(u32, i64)> = self
            .conn()
            .query_row(
                "SELECT schema_version, version FROM collections WHERE name = ?1",
                params![C::NAME],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((schema_version, version)) = header else {
            tracing::info!(collection = C::NAME, "seeding uninitialised collection");
            return self.reseed::<C>();
        };

        if schema_version != SCHEMA_VERSION {
            tracing::warn!(
                collection = C::NAME,
                found = schema_version,
                expected = SCHEMA_VERSION,
                "unknown collection schema, re-seeding"
            );
            return self.reseed::<C>();
        }

        let raw = {
            let mut stmt = self.conn().prepare(
                "SELECT id, body FROM records
                 WHERE collection = ?1
                 ORDER BY position ASC",
            )?;
            let rows = stmt.query_map(params![C::NAME], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        let mut records = Vec::with_capacity(raw.len());
        for (id, body) in raw {
            match serde_json::from_str::<C::Record>(&body) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(
                        collection = C::NAME,
                        record = %id,
                        error = %e,
                        "corrupt record, re-seeding collection"
                    );
                    return self.reseed::<C>();
                }
            }
        }

        tracing::debug!(collection = C::NAME, count = records.len(), "loaded collection");

        Ok(Versioned {
            records,
            version: version as u64,
        })
    }

    /// Replace the whole collection. Returns the new version.
    pub fn save<C: Collection>(&self, records: &[C::Record]) -> Result<u64> {
        self.write_collection::<C>(records, None)
    }

    /// Replace the whole collection if it is still at `expected`.
    ///
    /// Fails with [`StoreError::Conflict`] when another save happened since
    /// the caller's [`Database::load_versioned`].
    pub fn save_if_version<C: Collection>(
        &self,
        expected: u64,
        records: &[C::Record],
    ) -> Result<u64> {
        self.write_collection::<C>(records, Some(expected))
    }

    fn reseed<C: Collection>(&self) -> Result<Versioned<C::Record>> {
        let records = C::seed();
        let version = self.write_collection::<C>(&records, None)?;
        Ok(Versioned { records, version })
    }

    fn write_collection<C: Collection>(
        &self,
        records: &[C::Record],
        expected: Option<u64>,
    ) -> Result<u64> {
        let tx = self.conn().unchecked_transaction()?;
        let next = write_records::<C>(&tx, records, expected)?;
        tx.commit()?;
        Ok(next)
    }
}

/// Replace the records of `C` on `conn` and bump its version.
///
/// Does not open a transaction of its own; callers run it inside one so
/// several collections can be replaced together.
pub(crate) fn write_records<C: Collection>(
    conn: &Connection,
    records: &[C::Record],
    expected: Option<u64>,
) -> Result<u64> {
    let bodies = records
        .iter()
        .map(|r| Ok((r.record_id().to_string(), serde_json::to_string(r)?)))
        .collect::<Result<Vec<_>>>()?;

    let current: Option<i64> = conn
        .query_row(
            "SELECT version FROM collections WHERE name = ?1",
            params![C::NAME],
            |row| row.get(0),
        )
        .optional()?;
    let current = current.unwrap_or(0) as u64;

    if let Some(expected) = expected {
        if expected != current {
            return Err(StoreError::Conflict {
                collection: C::NAME,
                expected,
                found: current,
            });
        }
    }
    let next = current + 1;

    conn.execute(
        "INSERT INTO collections (name, schema_version, version, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(name) DO UPDATE SET
             schema_version = excluded.schema_version,
             version = excluded.version,
             updated_at = excluded.updated_at",
        params![C::NAME, SCHEMA_VERSION, next as i64, Utc::now().to_rfc3339()],
    )?;
    conn.execute("DELETE FROM records WHERE collection = ?1", params![C::NAME])?;
    {
        let mut insert = conn.prepare(
            "INSERT INTO records (collection, position, id, body)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (position, (id, body)) in bodies.iter().enumerate() {
            insert.execute(params![C::NAME, position as i64, id, body])?;
        }
    }

    tracing::debug!(
        collection = C::NAME,
        count = records.len(),
        version = next,
        "saved collection"
    );
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_shared::DepartmentId;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn first_load_seeds_and_persists() {
        let db = db();
        let first = db.load_versioned::<Departments>().unwrap();
        assert_eq!(first.records.len(), 3);
        assert_eq!(first.version, 1);

        // Second read hits the stored copy, not a fresh seed.
        let second = db.load_versioned::<Departments>().unwrap();
        assert_eq!(second.version, 1);
        assert_eq!(second.records, first.records);
    }

    #[test]
    fn save_replaces_whole_collection_in_order() {
        let db = db();
        let mut departments = db.load::<Departments>().unwrap();
        departments.reverse();
        departments.pop();
        db.save::<Departments>(&departments).unwrap();

        let loaded = db.load::<Departments>().unwrap();
        assert_eq!(loaded, departments);
    }

    #[test]
    fn stale_conditional_save_conflicts() {
        let db = db();
        let read = db.load_versioned::<Departments>().unwrap();

        db.save::<Departments>(&read.records).unwrap();

        let err = db
            .save_if_version::<Departments>(read.version, &read.records)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Conflict {
                collection: "departments",
                expected: 1,
                found: 2
            }
        ));
    }

    #[test]
    fn fresh_conditional_save_succeeds() {
        let db = db();
        let read = db.load_versioned::<Users>().unwrap();
        let next = db
            .save_if_version::<Users>(read.version, &read.records)
            .unwrap();
        assert_eq!(next, read.version + 1);
    }

    #[test]
    fn corrupt_record_reseeds_instead_of_failing() {
        let db = db();
        db.save::<Departments>(&[]).unwrap();
        db.conn()
            .execute(
                "INSERT INTO records (collection, position, id, body)
                 VALUES ('departments', 0, 'bad', '{not json')",
                [],
            )
            .unwrap();

        let loaded = db.load::<Departments>().unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].id, DepartmentId::from("d1"));
    }

    #[test]
    fn unknown_schema_tag_reseeds() {
        let db = db();
        db.save::<Departments>(&[]).unwrap();
        db.conn()
            .execute(
                "UPDATE collections SET schema_version = 99 WHERE name = 'departments'",
                [],
            )
            .unwrap();

        assert_eq!(db.load::<Departments>().unwrap().len(), 3);
    }

    #[test]
    fn saved_empty_collection_stays_empty() {
        let db = db();
        db.save::<Testimonials>(&[]).unwrap();
        assert!(db.load::<Testimonials>().unwrap().is_empty());
    }
}
