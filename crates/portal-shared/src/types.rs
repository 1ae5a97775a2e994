use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a portal account.
    UserId
);
opaque_id!(
    /// Identifier of an academic department.
    DepartmentId
);
opaque_id!(
    /// Identifier of an alumni testimonial.
    TestimonialId
);
opaque_id!(
    /// Identifier of a forum thread.
    ThreadId
);
opaque_id!(
    /// Identifier of a forum reply or a direct message.
    MessageId
);

/// The five portal roles. Every policy table matches on this exhaustively.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Principal,
    Hod,
    Coordinator,
    Alumni,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Principal,
        Role::Hod,
        Role::Coordinator,
        Role::Alumni,
    ];

    /// Admin and Principal accounts are institution-wide and never carry a
    /// department.
    pub fn is_department_scoped(self) -> bool {
        match self {
            Role::Admin | Role::Principal => false,
            Role::Hod | Role::Coordinator | Role::Alumni => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Principal => "PRINCIPAL",
            Role::Hod => "HOD",
            Role::Coordinator => "COORDINATOR",
            Role::Alumni => "ALUMNI",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "PRINCIPAL" => Ok(Role::Principal),
            "HOD" => Ok(Role::Hod),
            "COORDINATOR" => Ok(Role::Coordinator),
            "ALUMNI" => Ok(Role::Alumni),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Optional public profile links of a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}
