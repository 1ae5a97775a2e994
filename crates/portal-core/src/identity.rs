//! Authentication, registration and the session lifecycle.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use portal_shared::constants::{AVATAR_BASE_URL, AVATAR_SEED_RANGE};
use portal_shared::{DepartmentId, PortalError, Result, Role, SocialLinks, UserId};
use portal_store::{Departments, User, Users};

use crate::portal::{non_blank, Portal};
use crate::session::Session;

/// A self-registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub secret: String,
    pub role: Role,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    #[serde(default)]
    pub social_links: Option<SocialLinks>,
    /// Ignored: new accounts always start pending.
    #[serde(default)]
    pub is_approved: bool,
}

fn random_avatar() -> String {
    let seed = rand::thread_rng().gen_range(0..AVATAR_SEED_RANGE);
    format!("{AVATAR_BASE_URL}?random={seed}")
}

impl Portal {
    /// Resolve credentials to a session.
    ///
    /// Email and secret are compared exactly. A matching but unapproved
    /// account yields [`PortalError::PendingApproval`], anything else that
    /// does not match yields [`PortalError::InvalidCredentials`].
    pub fn authenticate(&self, email: &str, secret: &str) -> Result<Session> {
        let session = {
            let db = self.db()?;
            let users = db.load::<Users>()?;
            let user = users
                .iter()
                .find(|u| u.email == email && u.secret == secret)
                .ok_or_else(|| {
                    tracing::info!(email, "login rejected: invalid credentials");
                    PortalError::InvalidCredentials
                })?;

            if !user.is_approved {
                tracing::info!(user = %user.id, "login rejected: pending approval");
                return Err(PortalError::PendingApproval);
            }

            db.store_session(user)?;
            Session::from_user(user)
        };

        tracing::info!(user = %session.user_id(), role = %session.role(), "login");
        *self.current()? = Some(session.clone());
        Ok(session)
    }

    /// Create a pending account. Does not sign the caller in.
    pub fn register(&self, draft: UserDraft) -> Result<User> {
        let name = non_blank("name", &draft.name)?;
        let email = non_blank("email", &draft.email)?;
        if draft.secret.trim().is_empty() {
            return Err(PortalError::validation("secret must not be blank"));
        }

        let department_id = if draft.role.is_department_scoped() {
            draft.department_id
        } else {
            None
        };

        let db = self.db()?;

        if let Some(department_id) = &department_id {
            let departments = db.load::<Departments>()?;
            if !departments.iter().any(|d| &d.id == department_id) {
                return Err(PortalError::validation(format!(
                    "unknown department {department_id}"
                )));
            }
        }

        let mut users = db.load::<Users>()?;
        if users.iter().any(|u| u.email == email) {
            return Err(PortalError::validation(format!(
                "email {email} is already registered"
            )));
        }

        if draft.is_approved {
            tracing::debug!(email = %email, "ignoring caller-supplied approval flag");
        }

        let user = User {
            id: UserId::new(),
            name,
            email,
            secret: draft.secret,
            role: draft.role,
            department_id,
            is_approved: false,
            avatar: Some(random_avatar()),
            social_links: draft.social_links,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        db.save::<Users>(&users)?;

        tracing::info!(user = %user.id, role = %user.role, "registered pending account");
        Ok(user)
    }

    /// End the current session and forget the persisted copy.
    pub fn logout(&self) -> Result<()> {
        let previous = self.current()?.take();
        self.db()?.clear_session()?;
        if let Some(session) = previous {
            tracing::info!(user = %session.user_id(), "logout");
        }
        Ok(())
    }

    /// Pick up the session persisted by an earlier process.
    ///
    /// The stored user is taken as-is: it is not checked against the user
    /// collection, so a since-deleted or never-approved account comes back
    /// too. Operations called with it still look the account up and refuse
    /// one that is gone.
    pub fn restore_session(&self) -> Result<Option<Session>> {
        let restored = self.db()?.load_session()?.map(|user| Session::from_user(&user));
        if let Some(session) = &restored {
            tracing::info!(user = %session.user_id(), "session restored");
        }
        *self.current()? = restored.clone();
        Ok(restored)
    }

    /// The session opened by the last successful login or restore.
    pub fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.current()?.clone())
    }
}
