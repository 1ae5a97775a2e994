use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A record could not be encoded.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A conditional save found a newer collection than the caller read.
    #[error("Collection '{collection}' changed: expected version {expected}, found {found}")]
    Conflict {
        collection: &'static str,
        expected: u64,
        found: u64,
    },

    /// A snapshot breaks an invariant of the collections it would replace.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),
}

impl From<StoreError> for portal_shared::PortalError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidSnapshot(reason) => portal_shared::PortalError::Validation(reason),
            other => portal_shared::PortalError::Storage(other.to_string()),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
