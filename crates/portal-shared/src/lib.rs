//! # portal-shared
//!
//! Vocabulary shared by every portal crate: roles, typed identifiers, the
//! error taxonomy returned to callers, and the access policy tables that
//! decide what each role may see or change.

pub mod constants;
pub mod error;
pub mod policy;
pub mod types;

pub use error::{PortalError, Result};
pub use types::*;
