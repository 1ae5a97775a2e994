//! Role-shaped summary counters for the landing dashboard.

use serde::Serialize;

use portal_shared::policy::{self, Operation, Resource};
use portal_shared::{DepartmentId, Result, Role};
use portal_store::{Departments, Testimonials, Threads, Users};

use crate::portal::{resolve_actor, Portal};
use crate::session::Session;

/// Alumni registered under one department, pending ones included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCount {
    pub department_id: DepartmentId,
    pub name: String,
    pub alumni: usize,
}

/// Counters a `None` field means the caller's role does not get to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub approved_alumni: usize,
    /// Alumni waiting for approval; only for roles that approve accounts.
    pub pending_alumni: Option<usize>,
    pub threads: usize,
    /// Threads the caller opened.
    pub my_threads: usize,
    /// All alumni, approved or not, in the caller's own department.
    pub department_alumni: Option<usize>,
    pub alumni_by_department: Vec<DepartmentCount>,
    pub approved_testimonials: Option<usize>,
    pub pending_testimonials: Option<usize>,
}

impl Portal {
    pub fn dashboard_stats(&self, session: &Session) -> Result<DashboardStats> {
        let (actor, users, departments, testimonials, threads) = {
            let db = self.db()?;
            (
                resolve_actor(&db, session)?,
                db.load::<Users>()?,
                db.load::<Departments>()?,
                db.load::<Testimonials>()?,
                db.load::<Threads>()?,
            )
        };

        let alumni: Vec<_> = users.iter().filter(|u| u.role == Role::Alumni).collect();
        let approved_alumni = alumni.iter().filter(|u| u.is_approved).count();

        let pending_alumni = policy::decide(actor.role, Resource::Users, Operation::Moderate)
            .is_allowed()
            .then(|| {
                alumni
                    .iter()
                    .filter(|u| !u.is_approved && policy::can_approve_user(actor.member(), u.member()))
                    .count()
            });

        let in_department = |department: &DepartmentId| {
            alumni
                .iter()
                .filter(|u| u.department_id.as_ref() == Some(department))
                .count()
        };
        let department_alumni = actor.department_id.as_ref().map(in_department);

        let alumni_by_department = departments
            .into_iter()
            .map(|d| DepartmentCount {
                alumni: in_department(&d.id),
                department_id: d.id,
                name: d.name,
            })
            .collect();

        let (approved_testimonials, pending_testimonials) =
            if policy::decide(actor.role, Resource::Testimonials, Operation::Read).is_allowed() {
                let visible: Vec<_> = testimonials
                    .iter()
                    .filter(|t| policy::can_read_testimonial(actor.member(), t.department_id.as_ref()))
                    .collect();
                let approved = visible.iter().filter(|t| t.is_approved).count();
                (Some(approved), Some(visible.len() - approved))
            } else {
                (None, None)
            };

        Ok(DashboardStats {
            approved_alumni,
            pending_alumni,
            threads: threads.len(),
            my_threads: threads.iter().filter(|t| t.created_by_id == actor.id).count(),
            department_alumni,
            alumni_by_department,
            approved_testimonials,
            pending_testimonials,
        })
    }
}
