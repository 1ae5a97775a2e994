//! The [`Portal`] facade.
//!
//! Owns the entity store behind a mutex: every domain operation takes the
//! lock for its whole read-modify-write, so two mutations never interleave.

use std::sync::{Mutex, MutexGuard};

use portal_shared::policy::{self, Operation, Resource, Scope, Screen};
use portal_shared::{PortalError, Result};
use portal_store::{Database, ImportStats, Snapshot, User, Users};

use crate::config::PortalConfig;
use crate::session::Session;

pub struct Portal {
    db: Mutex<Database>,
    current: Mutex<Option<Session>>,
    config: PortalConfig,
}

impl Portal {
    /// Open the database named by `config` (or the platform default) and
    /// seed any collection that was never written.
    pub fn open(config: PortalConfig) -> Result<Self> {
        let db = match &config.db_path {
            Some(path) => {
                if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(dir)
                        .map_err(|e| PortalError::Storage(e.to_string()))?;
                }
                tracing::info!(path = %path.display(), "opening database");
                Database::open_at(path)?
            }
            None => Database::open_default()?,
        };
        Self::with_database(db, config)
    }

    /// A portal over a private in-memory store, seeded and empty of sessions.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_database(Database::open_in_memory()?, PortalConfig::default())
    }

    pub fn with_database(db: Database, config: PortalConfig) -> Result<Self> {
        db.bootstrap()?;
        tracing::info!(instance = %config.instance_name, "portal ready");
        Ok(Self {
            db: Mutex::new(db),
            current: Mutex::new(None),
            config,
        })
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub(crate) fn db(&self) -> Result<MutexGuard<'_, Database>> {
        self.db.lock().map_err(|_| PortalError::Poisoned)
    }

    pub(crate) fn current(&self) -> Result<MutexGuard<'_, Option<Session>>> {
        self.current.lock().map_err(|_| PortalError::Poisoned)
    }

    /// Whether the caller may navigate to `screen`, judged on the account's
    /// current role.
    pub fn can_enter(&self, session: &Session, screen: Screen) -> Result<bool> {
        let actor = resolve_actor(&*self.db()?, session)?;
        Ok(policy::can_enter(actor.role, screen))
    }

    /// Export every collection. Admin only: the snapshot carries secrets.
    pub fn export_snapshot(&self, session: &Session) -> Result<Snapshot> {
        let db = self.db()?;
        let actor = resolve_actor(&db, session)?;
        authorize(&actor, Resource::Snapshots, Operation::Read)?;
        Ok(db.export_snapshot()?)
    }

    /// Replace every collection with the snapshot's contents. Admin only.
    pub fn import_snapshot(&self, session: &Session, snapshot: &Snapshot) -> Result<ImportStats> {
        let db = self.db()?;
        let actor = resolve_actor(&db, session)?;
        authorize(&actor, Resource::Snapshots, Operation::Write)?;
        let stats = db.import_snapshot(snapshot)?;
        tracing::info!(actor = %actor.id, "snapshot imported");
        Ok(stats)
    }
}

/// The live account behind `session`.
///
/// Every operation decides on the account as it is now: a deleted account
/// is refused, and a changed role or department takes effect immediately.
pub(crate) fn resolve_actor(db: &Database, session: &Session) -> Result<User> {
    let actor = db
        .load::<Users>()?
        .into_iter()
        .find(|u| &u.id == session.user_id())
        .ok_or_else(|| {
            tracing::warn!(user = %session.user_id(), "session for a missing account");
            PortalError::forbidden(format!("account {} no longer exists", session.user_id()))
        })?;

    if !actor.is_approved {
        return Err(PortalError::PendingApproval);
    }
    Ok(actor)
}

/// Check the policy table for the actor, turning a denial into
/// [`PortalError::Forbidden`].
pub(crate) fn authorize(actor: &User, resource: Resource, operation: Operation) -> Result<Scope> {
    let scope = policy::decide(actor.role, resource, operation);
    if scope.is_allowed() {
        return Ok(scope);
    }
    tracing::warn!(
        user = %actor.id,
        role = %actor.role,
        ?resource,
        ?operation,
        "policy denied"
    );
    Err(PortalError::forbidden(format!(
        "{} may not {:?} {:?}",
        actor.role, operation, resource
    )))
}

/// Trimmed `value`, or a validation error naming `field` when it is blank.
pub(crate) fn non_blank(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PortalError::validation(format!("{field} must not be blank")));
    }
    Ok(trimmed.to_string())
}
