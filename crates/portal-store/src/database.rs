//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;

use crate::collection::{ChatMessages, Departments, Testimonials, Threads, Users};
use crate::error::{Result, StoreError};
use crate::migrations;

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the default application database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/alumni-portal/portal.db`
    /// - macOS:   `~/Library/Application Support/edu.jntugv.alumni-portal/portal.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\jntugv\alumni-portal\data\portal.db`
    pub fn open_default() -> Result<Self> {
        let path = default_path()?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        tracing::info!(path = %path.display(), "opening database");

        Self::open_at(&path)
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    /// Open a private in-memory database. Nothing survives the handle.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Touch every collection once so that missing ones are seeded.
    pub fn bootstrap(&self) -> Result<()> {
        let departments = self.load::<Departments>()?.len();
        let users = self.load::<Users>()?.len();
        let testimonials = self.load::<Testimonials>()?.len();
        let threads = self.load::<Threads>()?.len();
        let chats = self.load::<ChatMessages>()?.len();

        tracing::info!(
            departments,
            users,
            testimonials,
            threads,
            chats,
            "store bootstrapped"
        );
        Ok(())
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn
            .path()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }
}

/// Default on-disk location of the portal database.
pub fn default_path() -> Result<PathBuf> {
    let project_dirs =
        ProjectDirs::from("edu", "jntugv", "alumni-portal").ok_or(StoreError::NoDataDir)?;
    Ok(project_dirs.data_dir().join("portal.db"))
}
