//! User directory: listing, approval and deletion.

use portal_shared::policy::{self, Operation, Resource};
use portal_shared::{PortalError, Result, UserId};
use portal_store::{User, Users};

use crate::portal::{authorize, resolve_actor, Portal};
use crate::session::Session;

/// Narrowing applied on top of what the caller may see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Case-insensitive match against name or email.
    pub search: Option<String>,
    /// Only accounts still waiting for approval.
    pub pending_only: bool,
}

impl UserFilter {
    fn matches(&self, user: &User) -> bool {
        if self.pending_only && user.is_approved {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                user.name.to_lowercase().contains(&needle)
                    || user.email.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

impl Portal {
    /// Users the caller may see, in stored order.
    pub fn list_users(&self, session: &Session, filter: &UserFilter) -> Result<Vec<User>> {
        let db = self.db()?;
        let actor = resolve_actor(&db, session)?;
        authorize(&actor, Resource::Users, Operation::Read)?;

        Ok(db
            .load::<Users>()?
            .into_iter()
            .filter(|u| policy::can_read_user(actor.member(), u.member()) && filter.matches(u))
            .collect())
    }

    /// Mark a user approved. Role and department are left untouched and
    /// approving an approved user is a no-op.
    pub fn approve_user(&self, session: &Session, id: &UserId) -> Result<User> {
        let db = self.db()?;
        let actor = resolve_actor(&db, session)?;
        authorize(&actor, Resource::Users, Operation::Moderate)?;

        let mut users = db.load::<Users>()?;
        let user = users
            .iter_mut()
            .find(|u| &u.id == id)
            .ok_or_else(|| PortalError::not_found(format!("user {id}")))?;

        if !policy::can_approve_user(actor.member(), user.member()) {
            tracing::warn!(actor = %actor.id, target = %id, "approval outside scope");
            return Err(PortalError::forbidden(format!("cannot approve user {id}")));
        }

        if user.is_approved {
            return Ok(user.clone());
        }

        user.is_approved = true;
        let approved = user.clone();
        db.save::<Users>(&users)?;

        tracing::info!(actor = %actor.id, user = %id, "user approved");
        Ok(approved)
    }

    /// Hard-delete a user. Their testimonials, threads and messages stay
    /// behind with a dangling author id.
    pub fn delete_user(&self, session: &Session, id: &UserId) -> Result<()> {
        let db = self.db()?;
        let actor = resolve_actor(&db, session)?;
        authorize(&actor, Resource::Users, Operation::Delete)?;

        if &actor.id == id {
            return Err(PortalError::forbidden("cannot delete your own account"));
        }

        let mut users = db.load::<Users>()?;
        let index = users
            .iter()
            .position(|u| &u.id == id)
            .ok_or_else(|| PortalError::not_found(format!("user {id}")))?;

        if !policy::can_delete_user(actor.member(), users[index].member()) {
            return Err(PortalError::forbidden(format!("cannot delete user {id}")));
        }

        users.remove(index);
        db.save::<Users>(&users)?;

        tracing::info!(actor = %actor.id, user = %id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::UserDraft;
    use portal_shared::{DepartmentId, Role};

    fn portal() -> Portal {
        Portal::open_in_memory().unwrap()
    }

    fn login(portal: &Portal, email: &str) -> Session {
        portal.authenticate(email, "admin").unwrap()
    }

    fn register(portal: &Portal, email: &str, role: Role, department: Option<&str>) -> User {
        portal
            .register(UserDraft {
                name: format!("Pending {email}"),
                email: email.into(),
                secret: "pw".into(),
                role,
                department_id: department.map(DepartmentId::from),
                social_links: None,
                is_approved: false,
            })
            .unwrap()
    }

    #[test]
    fn admin_sees_everyone() {
        let portal = portal();
        let admin = login(&portal, "admin@jntugv.edu");
        let users = portal.list_users(&admin, &UserFilter::default()).unwrap();
        assert_eq!(users.len(), 5);
    }

    #[test]
    fn coordinator_sees_own_and_departmentless_alumni_only() {
        let portal = portal();
        register(&portal, "a-d1@x.edu", Role::Alumni, Some("d1"));
        register(&portal, "a-d2@x.edu", Role::Alumni, Some("d2"));
        register(&portal, "a-none@x.edu", Role::Alumni, None);
        register(&portal, "hod-d1@x.edu", Role::Hod, Some("d1"));

        let coord = login(&portal, "coord.cse@jntugv.edu");
        let emails: Vec<String> = portal
            .list_users(&coord, &UserFilter::default())
            .unwrap()
            .into_iter()
            .map(|u| u.email)
            .collect();

        assert_eq!(emails, vec!["alumni@gmail.com", "a-d1@x.edu", "a-none@x.edu"]);
    }

    #[test]
    fn filter_by_search_and_pending() {
        let portal = portal();
        register(&portal, "jane@x.edu", Role::Alumni, Some("d1"));
        let admin = login(&portal, "admin@jntugv.edu");

        let pending = portal
            .list_users(
                &admin,
                &UserFilter {
                    pending_only: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].email, "jane@x.edu");

        let found = portal
            .list_users(
                &admin,
                &UserFilter {
                    search: Some("PRINCIPAL".into()),
                    pending_only: false,
                },
            )
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].role, Role::Principal);
    }

    #[test]
    fn roles_without_directory_access_are_forbidden() {
        let portal = portal();
        for email in ["principal@jntugv.edu", "hod.cse@jntugv.edu", "alumni@gmail.com"] {
            let session = login(&portal, email);
            assert!(matches!(
                portal.list_users(&session, &UserFilter::default()),
                Err(PortalError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn approval_is_idempotent_and_preserves_fields() {
        let portal = portal();
        let pending = register(&portal, "p@x.edu", Role::Alumni, Some("d2"));
        let admin = login(&portal, "admin@jntugv.edu");

        let first = portal.approve_user(&admin, &pending.id).unwrap();
        let second = portal.approve_user(&admin, &pending.id).unwrap();

        assert!(first.is_approved);
        assert_eq!(first, second);
        assert_eq!(first.role, Role::Alumni);
        assert_eq!(first.department_id, Some(DepartmentId::from("d2")));
    }

    #[test]
    fn approving_missing_user_is_not_found() {
        let portal = portal();
        let admin = login(&portal, "admin@jntugv.edu");
        assert!(matches!(
            portal.approve_user(&admin, &UserId::from("ghost")),
            Err(PortalError::NotFound(_))
        ));
    }

    #[test]
    fn coordinator_cannot_approve_outside_scope() {
        let portal = portal();
        let other = register(&portal, "o@x.edu", Role::Alumni, Some("d3"));
        let hod = register(&portal, "h@x.edu", Role::Hod, Some("d1"));
        let coord = login(&portal, "coord.cse@jntugv.edu");

        for id in [&other.id, &hod.id] {
            assert!(matches!(
                portal.approve_user(&coord, id),
                Err(PortalError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn delete_rules() {
        let portal = portal();
        let admin = login(&portal, "admin@jntugv.edu");
        let coord = login(&portal, "coord.cse@jntugv.edu");

        assert!(matches!(
            portal.delete_user(&admin, admin.user_id()),
            Err(PortalError::Forbidden(_))
        ));
        assert!(matches!(
            portal.delete_user(&coord, &UserId::from("u5")),
            Err(PortalError::Forbidden(_))
        ));
        assert!(matches!(
            portal.delete_user(&admin, &UserId::from("ghost")),
            Err(PortalError::NotFound(_))
        ));

        portal.delete_user(&admin, &UserId::from("u5")).unwrap();
        let remaining = portal.list_users(&admin, &UserFilter::default()).unwrap();
        assert!(remaining.iter().all(|u| u.id.as_str() != "u5"));
    }

    #[test]
    fn deletion_does_not_cascade() {
        let portal = portal();
        let admin = login(&portal, "admin@jntugv.edu");
        portal.delete_user(&admin, &UserId::from("u5")).unwrap();

        let testimonials = portal.list_testimonials(&admin).unwrap();
        assert_eq!(testimonials.len(), 1);
        assert_eq!(testimonials[0].alumni_id, UserId::from("u5"));
    }

    #[test]
    fn deleted_coordinator_loses_access() {
        let portal = portal();
        let admin = login(&portal, "admin@jntugv.edu");
        let coord = login(&portal, "coord.cse@jntugv.edu");
        portal.delete_user(&admin, coord.user_id()).unwrap();

        assert!(matches!(
            portal.list_users(&coord, &UserFilter::default()),
            Err(PortalError::Forbidden(_))
        ));
        assert!(matches!(
            portal.create_thread(&coord, "Still here?"),
            Err(PortalError::Forbidden(_))
        ));
    }

    #[test]
    fn directory_scope_follows_current_department() {
        let portal = portal();
        let admin = login(&portal, "admin@jntugv.edu");
        let coord = login(&portal, "coord.cse@jntugv.edu");
        register(&portal, "ece@x.edu", Role::Alumni, Some("d2"));

        let mut snapshot = portal.export_snapshot(&admin).unwrap();
        for user in snapshot.users.iter_mut().filter(|u| &u.id == coord.user_id()) {
            user.department_id = Some(DepartmentId::from("d2"));
        }
        portal.import_snapshot(&admin, &snapshot).unwrap();

        let emails: Vec<String> = portal
            .list_users(&coord, &UserFilter::default())
            .unwrap()
            .into_iter()
            .map(|u| u.email)
            .collect();
        assert_eq!(emails, vec!["ece@x.edu"]);
    }
}
