//! Background refresh of an open conversation.
//!
//! Chat has no push channel: an open conversation is re-read on a fixed
//! interval and subscribers are woken only when its contents changed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use portal_shared::{Result, UserId};
use portal_store::ChatMessage;

use crate::portal::Portal;
use crate::session::Session;

pub struct ConversationPoller {
    handle: JoinHandle<()>,
    rx: watch::Receiver<Vec<ChatMessage>>,
}

impl ConversationPoller {
    /// Read the conversation once, then keep re-reading it every `interval`.
    ///
    /// The first read runs before the task is spawned so a forbidden or
    /// unknown peer is reported to the caller. Later reads go through the
    /// blocking pool. Must be called from within a tokio runtime.
    pub fn spawn(
        portal: Arc<Portal>,
        session: Session,
        peer: UserId,
        interval: Duration,
    ) -> Result<Self> {
        let initial = portal.list_conversation(&session, &peer)?;
        let (tx, rx) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the initial read is done.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    break;
                }
                let read = {
                    let portal = Arc::clone(&portal);
                    let session = session.clone();
                    let peer = peer.clone();
                    tokio::task::spawn_blocking(move || portal.list_conversation(&session, &peer))
                };
                match read.await {
                    Ok(Ok(latest)) => {
                        tx.send_if_modified(|current| {
                            if *current == latest {
                                return false;
                            }
                            *current = latest;
                            true
                        });
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(user = %session.user_id(), peer = %peer, error = %e, "conversation refresh failed");
                    }
                    Err(e) => {
                        tracing::warn!(user = %session.user_id(), peer = %peer, error = %e, "conversation refresh aborted");
                        break;
                    }
                }
            }
            tracing::debug!(user = %session.user_id(), peer = %peer, "conversation poller stopped");
        });

        Ok(Self { handle, rx })
    }

    /// A receiver that is notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<ChatMessage>> {
        self.rx.clone()
    }

    pub fn latest(&self) -> Vec<ChatMessage> {
        self.rx.borrow().clone()
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for ConversationPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl Portal {
    /// Start polling the conversation with `peer` at the configured interval.
    pub fn watch_conversation(
        self: &Arc<Self>,
        session: &Session,
        peer: &UserId,
    ) -> Result<ConversationPoller> {
        ConversationPoller::spawn(
            Arc::clone(self),
            session.clone(),
            peer.clone(),
            self.config().chat_poll_interval,
        )
    }
}
