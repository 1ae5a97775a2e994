//! Persisted session slot.
//!
//! Holds a copy of the signed-in user so a restarted process can pick the
//! session back up. The copy is returned as stored; whether that user still
//! exists or is still approved is not checked here.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::models::User;

impl Database {
    /// Remember `user` as the session subject, replacing any previous one.
    pub fn store_session(&self, user: &User) -> Result<()> {
        let body = serde_json::to_string(user)?;
        self.conn().execute(
            "INSERT INTO session (id, body, created_at) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET body = excluded.body, created_at = excluded.created_at",
            params![body, Utc::now().to_rfc3339()],
        )?;
        tracing::debug!(user = %user.id, "session stored");
        Ok(())
    }

    /// The stored session subject, if any. A corrupt slot reads as empty.
    pub fn load_session(&self) -> Result<Option<User>> {
        let body: Option<String> = self
            .conn()
            .query_row("SELECT body FROM session WHERE id = 1", [], |row| row.get(0))
            .optional()?;

        let Some(body) = body else {
            return Ok(None);
        };

        match serde_json::from_str(&body) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!(error = %e, "corrupt session slot, ignoring");
                Ok(None)
            }
        }
    }

    /// Forget the stored session subject.
    pub fn clear_session(&self) -> Result<()> {
        self.conn().execute("DELETE FROM session", [])?;
        Ok(())
    }
}
