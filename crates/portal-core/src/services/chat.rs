//! Direct messages between an HOD and the alumni of their department.

use chrono::Utc;

use portal_shared::policy::{self, Operation, Resource};
use portal_shared::{MessageId, PortalError, Result, UserId};
use portal_store::{ChatMessage, ChatMessages, Database, User, Users};

use crate::portal::{authorize, non_blank, resolve_actor, Portal};
use crate::session::Session;

fn find_peer(db: &Database, peer_id: &UserId) -> Result<User> {
    db.load::<Users>()?
        .into_iter()
        .find(|u| &u.id == peer_id)
        .ok_or_else(|| PortalError::not_found(format!("user {peer_id}")))
}

fn ensure_can_message(actor: &User, peer: &User) -> Result<()> {
    if policy::can_message(actor.member(), peer.member()) {
        return Ok(());
    }
    tracing::warn!(user = %actor.id, peer = %peer.id, "direct message outside scope");
    Err(PortalError::forbidden(format!(
        "cannot message user {}",
        peer.id
    )))
}

impl Portal {
    /// Everyone the caller may open a conversation with.
    pub fn list_contacts(&self, session: &Session) -> Result<Vec<User>> {
        let db = self.db()?;
        let actor = resolve_actor(&db, session)?;
        authorize(&actor, Resource::DirectMessages, Operation::Read)?;

        Ok(db
            .load::<Users>()?
            .into_iter()
            .filter(|u| policy::can_message(actor.member(), u.member()))
            .collect())
    }

    pub fn send_message(
        &self,
        session: &Session,
        peer_id: &UserId,
        text: &str,
    ) -> Result<ChatMessage> {
        let db = self.db()?;
        let actor = resolve_actor(&db, session)?;
        authorize(&actor, Resource::DirectMessages, Operation::Write)?;
        let text = non_blank("message", text)?;

        let peer = find_peer(&db, peer_id)?;
        ensure_can_message(&actor, &peer)?;

        let mut messages = db.load::<ChatMessages>()?;
        let message = ChatMessage {
            id: MessageId::new(),
            sender_id: actor.id,
            receiver_id: peer.id,
            message: text,
            timestamp: Utc::now(),
            read: false,
        };
        messages.push(message.clone());
        db.save::<ChatMessages>(&messages)?;

        tracing::debug!(from = %message.sender_id, to = %message.receiver_id, "direct message sent");
        Ok(message)
    }

    /// The conversation with `peer_id`, oldest first. Both participants see
    /// the same sequence.
    pub fn list_conversation(&self, session: &Session, peer_id: &UserId) -> Result<Vec<ChatMessage>> {
        let db = self.db()?;
        let actor = resolve_actor(&db, session)?;
        authorize(&actor, Resource::DirectMessages, Operation::Read)?;

        let peer = find_peer(&db, peer_id)?;
        ensure_can_message(&actor, &peer)?;

        let mut conversation: Vec<ChatMessage> = db
            .load::<ChatMessages>()?
            .into_iter()
            .filter(|m| m.is_between(&actor.id, peer_id))
            .collect();
        conversation.sort_by_key(|m| m.timestamp);
        Ok(conversation)
    }
}
