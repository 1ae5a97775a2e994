//! Domain model structs persisted in the entity store.
//!
//! Every struct derives `Serialize` and `Deserialize`; the JSON form is the
//! record body written to the `records` table and handed to callers as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use portal_shared::policy::Member;
use portal_shared::{
    DepartmentId, MessageId, Role, SocialLinks, TestimonialId, ThreadId, UserId,
};

// ---------------------------------------------------------------------------
// Department
// ---------------------------------------------------------------------------

/// An academic department.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: DepartmentId,
    /// Display name, never blank.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A portal account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Login name, unique across users.
    pub email: String,
    /// Login secret, compared verbatim.
    pub secret: String,
    pub role: Role,
    /// Always `None` for Admin and Principal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<DepartmentId>,
    pub is_approved: bool,
    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The policy view of this account.
    pub fn member(&self) -> Member<'_> {
        Member {
            id: &self.id,
            role: self.role,
            department: self.department_id.as_ref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Testimonial
// ---------------------------------------------------------------------------

/// An alumni testimonial awaiting or past moderation.
///
/// `alumni_name` and `department_id` are copied from the author when the
/// testimonial is submitted and are never refreshed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: TestimonialId,
    pub alumni_id: UserId,
    pub alumni_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<DepartmentId>,
    pub text: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Forum
// ---------------------------------------------------------------------------

/// A reply inside a forum thread. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThreadMessage {
    pub id: MessageId,
    pub text: String,
    pub sender_id: UserId,
    pub sender_name: String,
    pub timestamp: DateTime<Utc>,
}

/// A forum topic owning its replies in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: ThreadId,
    pub title: String,
    pub created_by_id: UserId,
    pub created_by_name: String,
    #[serde(default)]
    pub messages: Vec<ThreadMessage>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Direct messages
// ---------------------------------------------------------------------------

/// A single direct message between two users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Stored for clients; nothing in the core sets it.
    #[serde(default)]
    pub read: bool,
}

impl ChatMessage {
    /// Whether this message belongs to the undirected conversation `{a, b}`.
    pub fn is_between(&self, a: &UserId, b: &UserId) -> bool {
        (&self.sender_id == a && &self.receiver_id == b)
            || (&self.sender_id == b && &self.receiver_id == a)
    }
}
