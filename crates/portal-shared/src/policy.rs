//! Access policy.
//!
//! Pure functions that decide, for a role and a resource, whether an
//! operation is allowed and over which rows. Nothing here reads a clock or
//! any stored state: the answer depends only on the role, on whether
//! departments match, and on the fields handed in.
//!
//! [`decide`] is the table. The `can_*` helpers apply a table entry to a
//! concrete subject row, and [`can_enter`] derives screen access from the
//! same table so navigation can never be looser than the operations behind
//! it.

use serde::{Deserialize, Serialize};

use crate::types::{DepartmentId, Role, UserId};

/// A collection the policy has an opinion about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Users,
    Departments,
    Testimonials,
    Threads,
    DirectMessages,
    /// Whole-store export and import.
    Snapshots,
}

/// What the actor wants to do with a resource.
///
/// Approving a user and approving or rejecting a testimonial are both
/// `Moderate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Read,
    Write,
    Moderate,
    Delete,
}

/// Which rows an allowed operation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Denied,
    /// Only rows tied to the actor's own department.
    OwnDepartment,
    All,
}

impl Scope {
    pub fn is_allowed(self) -> bool {
        !matches!(self, Scope::Denied)
    }
}

/// Screens a presentation layer can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    Dashboard,
    Forum,
    Chat,
    Profile,
    Users,
    Departments,
    Testimonials,
}

/// The policy-relevant facts about one account: who it is, its role, and
/// its department.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member<'a> {
    pub id: &'a UserId,
    pub role: Role,
    pub department: Option<&'a DepartmentId>,
}

/// The decision table.
pub fn decide(role: Role, resource: Resource, operation: Operation) -> Scope {
    use Operation::*;
    use Role::*;

    match resource {
        Resource::Users => match role {
            Admin => match operation {
                Read | Moderate | Delete => Scope::All,
                Write => Scope::Denied,
            },
            Coordinator => match operation {
                Read | Moderate => Scope::OwnDepartment,
                Write | Delete => Scope::Denied,
            },
            Principal | Hod | Alumni => Scope::Denied,
        },
        Resource::Departments => match operation {
            Read => match role {
                Admin | Principal | Hod | Coordinator | Alumni => Scope::All,
            },
            Write => match role {
                Admin => Scope::All,
                Principal | Hod | Coordinator | Alumni => Scope::Denied,
            },
            Moderate | Delete => Scope::Denied,
        },
        Resource::Testimonials => match operation {
            Read => match role {
                Admin | Principal => Scope::All,
                Hod => Scope::OwnDepartment,
                Coordinator | Alumni => Scope::Denied,
            },
            Write => match role {
                Alumni => Scope::All,
                Admin | Principal | Hod | Coordinator => Scope::Denied,
            },
            Moderate => match role {
                Admin => Scope::All,
                Principal | Hod | Coordinator | Alumni => Scope::Denied,
            },
            Delete => Scope::Denied,
        },
        Resource::Threads => match operation {
            Read => match role {
                Admin | Principal | Hod | Coordinator | Alumni => Scope::All,
            },
            Write => match role {
                Hod | Coordinator | Alumni => Scope::All,
                Admin | Principal => Scope::Denied,
            },
            Moderate | Delete => Scope::Denied,
        },
        Resource::DirectMessages => match operation {
            Read | Write => match role {
                Hod | Alumni => Scope::OwnDepartment,
                Admin | Principal | Coordinator => Scope::Denied,
            },
            Moderate | Delete => Scope::Denied,
        },
        Resource::Snapshots => match operation {
            Read | Write => match role {
                Admin => Scope::All,
                Principal | Hod | Coordinator | Alumni => Scope::Denied,
            },
            Moderate | Delete => Scope::Denied,
        },
    }
}

/// Both sides carry a department and it is the same one.
pub fn same_department(a: Option<&DepartmentId>, b: Option<&DepartmentId>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

/// The only role a direct-message participant may talk to.
pub fn message_counterpart(role: Role) -> Option<Role> {
    match role {
        Role::Hod => Some(Role::Alumni),
        Role::Alumni => Some(Role::Hod),
        Role::Admin | Role::Principal | Role::Coordinator => None,
    }
}

fn user_in_scope(scope: Scope, actor: Member<'_>, subject: Member<'_>) -> bool {
    match scope {
        Scope::All => true,
        // A departmentless alumnus is visible to every coordinator.
        Scope::OwnDepartment => {
            subject.role == Role::Alumni
                && (subject.department.is_none() || subject.department == actor.department)
        }
        Scope::Denied => false,
    }
}

/// May `actor` see `subject` in the user directory?
pub fn can_read_user(actor: Member<'_>, subject: Member<'_>) -> bool {
    user_in_scope(decide(actor.role, Resource::Users, Operation::Read), actor, subject)
}

/// May `actor` approve `subject`?
pub fn can_approve_user(actor: Member<'_>, subject: Member<'_>) -> bool {
    user_in_scope(
        decide(actor.role, Resource::Users, Operation::Moderate),
        actor,
        subject,
    )
}

/// May `actor` delete `subject`? Deleting yourself is never allowed.
pub fn can_delete_user(actor: Member<'_>, subject: Member<'_>) -> bool {
    if actor.id == subject.id {
        return false;
    }
    user_in_scope(
        decide(actor.role, Resource::Users, Operation::Delete),
        actor,
        subject,
    )
}

/// May `actor` see a testimonial stored under `department`?
///
/// The stored department is the one captured at submission; it does not
/// follow the author.
pub fn can_read_testimonial(actor: Member<'_>, department: Option<&DepartmentId>) -> bool {
    match decide(actor.role, Resource::Testimonials, Operation::Read) {
        Scope::All => true,
        Scope::OwnDepartment => same_department(actor.department, department),
        Scope::Denied => false,
    }
}

/// May `actor` exchange direct messages with `peer`?
pub fn can_message(actor: Member<'_>, peer: Member<'_>) -> bool {
    if actor.id == peer.id {
        return false;
    }
    match decide(actor.role, Resource::DirectMessages, Operation::Write) {
        Scope::All => true,
        Scope::OwnDepartment => {
            message_counterpart(actor.role) == Some(peer.role)
                && same_department(actor.department, peer.department)
        }
        Scope::Denied => false,
    }
}

/// Screen access, derived from [`decide`].
pub fn can_enter(role: Role, screen: Screen) -> bool {
    match screen {
        Screen::Dashboard | Screen::Forum | Screen::Profile => true,
        Screen::Users => decide(role, Resource::Users, Operation::Read).is_allowed(),
        Screen::Departments => decide(role, Resource::Departments, Operation::Write).is_allowed(),
        Screen::Testimonials => decide(role, Resource::Testimonials, Operation::Read).is_allowed(),
        Screen::Chat => decide(role, Resource::DirectMessages, Operation::Read).is_allowed(),
    }
}
