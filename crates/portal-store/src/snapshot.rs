use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use portal_shared::DepartmentId;

use crate::collection::{
    write_records, ChatMessages, Departments, Record, Testimonials, Threads, Users,
    SCHEMA_VERSION,
};
use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{ChatMessage, Department, Testimonial, Thread, User};

/// Full store export, every collection in stored order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Record format of the collections below
    pub schema_version: u32,
    /// When the snapshot was taken
    pub created_at: DateTime<Utc>,
    /// Crate version that produced the snapshot
    pub version: String,
    pub departments: Vec<Department>,
    pub users: Vec<User>,
    pub testimonials: Vec<Testimonial>,
    pub threads: Vec<Thread>,
    pub chat_messages: Vec<ChatMessage>,
}

/// Record counts written by [`Database::import_snapshot`].
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportStats {
    pub departments: usize,
    pub users: usize,
    pub testimonials: usize,
    pub threads: usize,
    pub chat_messages: usize,
}

impl Database {
    /// Export every collection into a serializable snapshot.
    pub fn export_snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            schema_version: SCHEMA_VERSION,
            created_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            departments: self.load::<Departments>()?,
            users: self.load::<Users>()?,
            testimonials: self.load::<Testimonials>()?,
            threads: self.load::<Threads>()?,
            chat_messages: self.load::<ChatMessages>()?,
        })
    }

    /// Replace every collection with the snapshot's contents.
    ///
    /// The snapshot is checked first and then written in one transaction:
    /// either every collection is replaced or none is.
    pub fn import_snapshot(&self, snapshot: &Snapshot) -> Result<ImportStats> {
        if snapshot.schema_version != SCHEMA_VERSION {
            return Err(StoreError::Migration(format!(
                "snapshot schema {} is not supported (expected {})",
                snapshot.schema_version, SCHEMA_VERSION
            )));
        }
        snapshot.validate()?;

        let tx = self.conn().unchecked_transaction()?;
        write_records::<Departments>(&tx, &snapshot.departments, None)?;
        write_records::<Users>(&tx, &snapshot.users, None)?;
        write_records::<Testimonials>(&tx, &snapshot.testimonials, None)?;
        write_records::<Threads>(&tx, &snapshot.threads, None)?;
        write_records::<ChatMessages>(&tx, &snapshot.chat_messages, None)?;
        tx.commit()?;

        let stats = ImportStats {
            departments: snapshot.departments.len(),
            users: snapshot.users.len(),
            testimonials: snapshot.testimonials.len(),
            threads: snapshot.threads.len(),
            chat_messages: snapshot.chat_messages.len(),
        };
        tracing::info!(?stats, "snapshot imported");
        Ok(stats)
    }
}

fn unique_ids<'a, R: Record + 'a>(
    collection: &str,
    records: impl IntoIterator<Item = &'a R>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for record in records {
        if !seen.insert(record.record_id()) {
            return Err(StoreError::InvalidSnapshot(format!(
                "duplicate id {} in {collection}",
                record.record_id()
            )));
        }
    }
    Ok(())
}

impl Snapshot {
    /// Check the invariants registration maintains for live data.
    pub fn validate(&self) -> Result<()> {
        unique_ids("departments", &self.departments)?;
        unique_ids("users", &self.users)?;
        unique_ids("testimonials", &self.testimonials)?;
        unique_ids("threads", &self.threads)?;
        unique_ids("chat messages", &self.chat_messages)?;

        if let Some(blank) = self.departments.iter().find(|d| d.name.trim().is_empty()) {
            return Err(StoreError::InvalidSnapshot(format!(
                "department {} has a blank name",
                blank.id
            )));
        }

        let departments: HashSet<&DepartmentId> = self.departments.iter().map(|d| &d.id).collect();
        let mut emails = HashSet::new();
        for user in &self.users {
            if !emails.insert(user.email.as_str()) {
                return Err(StoreError::InvalidSnapshot(format!(
                    "email {} is used by more than one user",
                    user.email
                )));
            }
            match &user.department_id {
                Some(department) if !user.role.is_department_scoped() => {
                    return Err(StoreError::InvalidSnapshot(format!(
                        "{} user {} must not belong to department {department}",
                        user.role, user.id
                    )));
                }
                Some(department) if !departments.contains(department) => {
                    return Err(StoreError::InvalidSnapshot(format!(
                        "user {} references unknown department {department}",
                        user.id
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_then_import_into_fresh_store() {
        let source = Database::open_in_memory().unwrap();
        let mut departments = source.load::<Departments>().unwrap();
        departments.truncate(2);
        source.save::<Departments>(&departments).unwrap();

        let snapshot = source.export_snapshot().unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();

        let target = Database::open_in_memory().unwrap();
        let stats = target.import_snapshot(&parsed).unwrap();

        assert_eq!(stats.departments, 2);
        assert_eq!(stats.users, 5);
        assert_eq!(target.load::<Departments>().unwrap(), departments);
    }

    #[test]
    fn unknown_snapshot_schema_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let mut snapshot = db.export_snapshot().unwrap();
        snapshot.schema_version = 42;
        assert!(matches!(
            db.import_snapshot(&snapshot),
            Err(StoreError::Migration(_))
        ));
    }

    #[test]
    fn rejected_snapshot_leaves_store_untouched() {
        let db = Database::open_in_memory().unwrap();
        let mut snapshot = db.export_snapshot().unwrap();
        snapshot.departments.truncate(1);
        let duplicate = snapshot.users[0].clone();
        snapshot.users.push(duplicate);

        assert!(matches!(
            db.import_snapshot(&snapshot),
            Err(StoreError::InvalidSnapshot(_))
        ));
        assert_eq!(db.load::<Departments>().unwrap().len(), 3);
        assert_eq!(db.load::<Users>().unwrap().len(), 5);
    }

    #[test]
    fn snapshot_invariants_match_registration() {
        let db = Database::open_in_memory().unwrap();
        let clean = db.export_snapshot().unwrap();
        assert!(clean.validate().is_ok());

        let mut same_email = clean.clone();
        same_email.users[1].email = same_email.users[0].email.clone();
        assert!(matches!(same_email.validate(), Err(StoreError::InvalidSnapshot(_))));

        let mut departmental_admin = clean.clone();
        departmental_admin.users[0].department_id = Some(DepartmentId::from("d1"));
        assert!(matches!(
            departmental_admin.validate(),
            Err(StoreError::InvalidSnapshot(_))
        ));

        let mut dangling = clean;
        dangling.users[4].department_id = Some(DepartmentId::from("d9"));
        assert!(matches!(dangling.validate(), Err(StoreError::InvalidSnapshot(_))));
    }
}
