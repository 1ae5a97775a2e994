//! # portal-store
//!
//! Entity store for the alumni portal, backed by SQLite.
//!
//! Data lives in independent keyed collections (users, departments,
//! testimonials, threads, chat messages). A collection is always loaded and
//! saved whole: `save` replaces every record in one transaction, so a reader
//! never observes a half-written collection. Collections that were never
//! written, or whose contents no longer decode, are filled from the seed
//! set instead of failing.

pub mod collection;
pub mod database;
pub mod migrations;
pub mod models;
pub mod seed;
pub mod session;
pub mod snapshot;

mod error;

pub use collection::{
    ChatMessages, Collection, Departments, Record, Testimonials, Threads, Users, Versioned,
};
pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
pub use snapshot::{ImportStats, Snapshot};
