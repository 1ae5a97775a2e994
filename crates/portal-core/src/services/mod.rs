//! Domain services.
//!
//! Each sub-module adds the operations for one entity to [`Portal`]. All of
//! them follow the same shape: authorize the session, take the store lock,
//! load the collection, apply the change, save the whole collection.
//!
//! [`Portal`]: crate::Portal

pub mod chat;
pub mod dashboard;
pub mod departments;
pub mod forum;
pub mod testimonials;
pub mod users;
