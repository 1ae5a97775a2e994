//! # portal-core
//!
//! Identity, session handling and the domain services of the alumni portal.
//!
//! Callers go through [`Portal`]: authenticate to obtain a [`Session`], then
//! pass that session to every operation. Each operation checks the access
//! policy before it reads or writes the entity store, and every write is a
//! whole-collection read-modify-write done under the portal's writer lock.

pub mod config;
pub mod identity;
pub mod poller;
pub mod portal;
pub mod services;
pub mod session;

pub use config::PortalConfig;
pub use identity::UserDraft;
pub use poller::ConversationPoller;
pub use portal::Portal;
pub use services::dashboard::{DashboardStats, DepartmentCount};
pub use services::testimonials::Moderation;
pub use services::users::UserFilter;
pub use session::Session;

pub use portal_shared::policy::Screen;
pub use portal_shared::{PortalError, Result, Role};
pub use portal_store::{
    ChatMessage, Department, ImportStats, Snapshot, Testimonial, Thread, ThreadMessage, User,
};
