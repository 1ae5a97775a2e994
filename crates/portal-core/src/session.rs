use serde::Serialize;

use portal_shared::{DepartmentId, Role, UserId};
use portal_store::User;

/// The authenticated caller, passed explicitly to every domain operation.
///
/// Only [`Portal::authenticate`] and [`Portal::restore_session`] hand one
/// out. The role and department are what the account looked like when the
/// session was opened; operations look the account up again and decide on
/// its current state.
///
/// [`Portal::authenticate`]: crate::Portal::authenticate
/// [`Portal::restore_session`]: crate::Portal::restore_session
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    user_id: UserId,
    name: String,
    role: Role,
    department_id: Option<DepartmentId>,
}

impl Session {
    pub(crate) fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
            department_id: user.department_id.clone(),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn department_id(&self) -> Option<&DepartmentId> {
        self.department_id.as_ref()
    }
}
