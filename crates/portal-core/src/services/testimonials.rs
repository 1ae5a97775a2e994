//! Testimonial submission, moderation and the public feed.

use chrono::Utc;
use serde::Serialize;

use portal_shared::policy::{self, Operation, Resource};
use portal_shared::{PortalError, Result, TestimonialId};
use portal_store::{Testimonial, Testimonials};

use crate::portal::{authorize, non_blank, resolve_actor, Portal};
use crate::session::Session;

/// Outcome of [`Portal::moderate_testimonial`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Moderation {
    Approved(Testimonial),
    /// The testimonial is gone for good.
    Rejected(TestimonialId),
}

impl Portal {
    /// Submit a testimonial for moderation.
    ///
    /// The author's name and department are copied from their account now;
    /// later changes to the account do not touch the testimonial.
    pub fn submit_testimonial(&self, session: &Session, text: &str) -> Result<Testimonial> {
        let db = self.db()?;
        let author = resolve_actor(&db, session)?;
        authorize(&author, Resource::Testimonials, Operation::Write)?;
        let text = non_blank("testimonial", text)?;

        let mut testimonials = db.load::<Testimonials>()?;
        let testimonial = Testimonial {
            id: TestimonialId::new(),
            alumni_id: author.id,
            alumni_name: author.name,
            department_id: author.department_id,
            text,
            is_approved: false,
            created_at: Utc::now(),
        };
        testimonials.push(testimonial.clone());
        db.save::<Testimonials>(&testimonials)?;

        tracing::info!(author = %testimonial.alumni_id, testimonial = %testimonial.id, "testimonial submitted");
        Ok(testimonial)
    }

    /// Testimonials in the caller's moderation view, pending and approved.
    pub fn list_testimonials(&self, session: &Session) -> Result<Vec<Testimonial>> {
        let db = self.db()?;
        let actor = resolve_actor(&db, session)?;
        authorize(&actor, Resource::Testimonials, Operation::Read)?;

        Ok(db
            .load::<Testimonials>()?
            .into_iter()
            .filter(|t| policy::can_read_testimonial(actor.member(), t.department_id.as_ref()))
            .collect())
    }

    /// Approve in place, or reject by deleting the record.
    pub fn moderate_testimonial(
        &self,
        session: &Session,
        id: &TestimonialId,
        approve: bool,
    ) -> Result<Moderation> {
        let db = self.db()?;
        let actor = resolve_actor(&db, session)?;
        authorize(&actor, Resource::Testimonials, Operation::Moderate)?;

        let mut testimonials = db.load::<Testimonials>()?;
        let index = testimonials
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| PortalError::not_found(format!("testimonial {id}")))?;

        let outcome = if approve {
            let testimonial = &mut testimonials[index];
            testimonial.is_approved = true;
            Moderation::Approved(testimonial.clone())
        } else {
            testimonials.remove(index);
            Moderation::Rejected(id.clone())
        };
        db.save::<Testimonials>(&testimonials)?;

        tracing::info!(actor = %actor.id, testimonial = %id, approve, "testimonial moderated");
        Ok(outcome)
    }

    /// Approved testimonials for the public landing feed, at most `limit`.
    pub fn public_testimonials(&self, limit: usize) -> Result<Vec<Testimonial>> {
        Ok(self
            .db()?
            .load::<Testimonials>()?
            .into_iter()
            .filter(|t| t.is_approved)
            .take(limit)
            .collect())
    }
}
