//! Discussion threads.

use chrono::Utc;

use portal_shared::policy::{Operation, Resource};
use portal_shared::{MessageId, PortalError, Result, ThreadId};
use portal_store::{Thread, ThreadMessage, Threads};

use crate::portal::{authorize, non_blank, resolve_actor, Portal};
use crate::session::Session;

impl Portal {
    /// Every thread, newest first.
    pub fn list_threads(&self, session: &Session) -> Result<Vec<Thread>> {
        let db = self.db()?;
        let actor = resolve_actor(&db, session)?;
        authorize(&actor, Resource::Threads, Operation::Read)?;
        Ok(db.load::<Threads>()?)
    }

    pub fn get_thread(&self, session: &Session, id: &ThreadId) -> Result<Thread> {
        let db = self.db()?;
        let actor = resolve_actor(&db, session)?;
        authorize(&actor, Resource::Threads, Operation::Read)?;
        db.load::<Threads>()?
            .into_iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| PortalError::not_found(format!("thread {id}")))
    }

    /// Open a new thread. It goes to the front of the list.
    pub fn create_thread(&self, session: &Session, title: &str) -> Result<Thread> {
        let db = self.db()?;
        let actor = resolve_actor(&db, session)?;
        authorize(&actor, Resource::Threads, Operation::Write)?;
        let title = non_blank("title", title)?;

        let mut threads = db.load::<Threads>()?;
        let thread = Thread {
            id: ThreadId::new(),
            title,
            created_by_id: actor.id.clone(),
            created_by_name: actor.name.clone(),
            messages: Vec::new(),
            created_at: Utc::now(),
        };
        threads.insert(0, thread.clone());
        db.save::<Threads>(&threads)?;

        tracing::info!(user = %actor.id, thread = %thread.id, "thread created");
        Ok(thread)
    }

    /// Append a reply to the end of a thread.
    pub fn reply_to_thread(
        &self,
        session: &Session,
        thread_id: &ThreadId,
        text: &str,
    ) -> Result<ThreadMessage> {
        let db = self.db()?;
        let actor = resolve_actor(&db, session)?;
        authorize(&actor, Resource::Threads, Operation::Write)?;
        let text = non_blank("reply", text)?;

        let mut threads = db.load::<Threads>()?;
        let thread = threads
            .iter_mut()
            .find(|t| &t.id == thread_id)
            .ok_or_else(|| PortalError::not_found(format!("thread {thread_id}")))?;

        let reply = ThreadMessage {
            id: MessageId::new(),
            text,
            sender_id: actor.id.clone(),
            sender_name: actor.name.clone(),
            timestamp: Utc::now(),
        };
        thread.messages.push(reply.clone());
        db.save::<Threads>(&threads)?;

        tracing::debug!(user = %actor.id, thread = %thread_id, "reply posted");
        Ok(reply)
    }
}
