use thiserror::Error;

/// Failure kinds returned to callers of the portal core.
///
/// Every variant is recoverable; the presentation layer decides how to show
/// it. `InvalidCredentials` and `PendingApproval` are kept apart so a login
/// screen can tell "wrong password" from "waiting for approval".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortalError {
    #[error("Invalid email or secret")]
    InvalidCredentials,

    #[error("Account pending approval by Admin/Coordinator")]
    PendingApproval,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Portal state lock poisoned")]
    Poisoned,
}

impl PortalError {
    pub fn forbidden(what: impl Into<String>) -> Self {
        Self::Forbidden(what.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(what: impl Into<String>) -> Self {
        Self::Validation(what.into())
    }
}

/// Convenience alias used throughout the portal crates.
pub type Result<T> = std::result::Result<T, PortalError>;
