use chrono::Utc;

use portal_shared::policy::{Operation, Resource};
use portal_shared::{DepartmentId, Result};
use portal_store::{Department, Departments};

use crate::portal::{authorize, non_blank, resolve_actor, Portal};
use crate::session::Session;

impl Portal {
    /// All departments. Readable without a session, e.g. by a registration form.
    pub fn list_departments(&self) -> Result<Vec<Department>> {
        Ok(self.db()?.load::<Departments>()?)
    }

    pub fn create_department(&self, session: &Session, name: &str) -> Result<Department> {
        let db = self.db()?;
        let actor = resolve_actor(&db, session)?;
        authorize(&actor, Resource::Departments, Operation::Write)?;
        let name = non_blank("department name", name)?;

        let mut departments = db.load::<Departments>()?;
        let department = Department {
            id: DepartmentId::new(),
            name,
            created_at: Utc::now(),
        };
        departments.push(department.clone());
        db.save::<Departments>(&departments)?;

        tracing::info!(actor = %actor.id, department = %department.id, name = %department.name, "department created");
        Ok(department)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_shared::PortalError;

    #[test]
    fn admin_creates_department_appended_last() {
        let portal = Portal::open_in_memory().unwrap();
        let admin = portal.authenticate("admin@jntugv.edu", "admin").unwrap();

        let created = portal.create_department(&admin, "  Civil (CIV) ").unwrap();
        assert_eq!(created.name, "Civil (CIV)");

        let all = portal.list_departments().unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all.last().unwrap().id, created.id);
    }

    #[test]
    fn blank_name_is_rejected() {
        let portal = Portal::open_in_memory().unwrap();
        let admin = portal.authenticate("admin@jntugv.edu", "admin").unwrap();
        assert!(matches!(
            portal.create_department(&admin, "   "),
            Err(PortalError::Validation(_))
        ));
    }

    #[test]
    fn non_admins_cannot_create() {
        let portal = Portal::open_in_memory().unwrap();
        for email in [
            "principal@jntugv.edu",
            "hod.cse@jntugv.edu",
            "coord.cse@jntugv.edu",
            "alumni@gmail.com",
        ] {
            let session = portal.authenticate(email, "admin").unwrap();
            assert!(matches!(
                portal.create_department(&session, "Chemistry"),
                Err(PortalError::Forbidden(_))
            ));
        }
        assert_eq!(portal.list_departments().unwrap().len(), 3);
    }
}
