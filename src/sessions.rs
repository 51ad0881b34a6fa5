//! Login sessions backed by the `sessions` table.

use std::time::Duration;

use chrono::Utc;

use crate::storage::models::SessionRecord;
use crate::storage::{Database, DatabaseError};

#[derive(Clone)]
pub struct SessionStore {
    db: Database,
    ttl: chrono::Duration,
}

impl SessionStore {
    pub fn new(db: Database, ttl_secs: i64) -> Self {
        Self {
            db,
            ttl: chrono::Duration::seconds(ttl_secs),
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Start a session for `username` and return its id
    pub fn create(&self, username: &str) -> Result<String, DatabaseError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let session = SessionRecord {
            username: username.to_string(),
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.db.put_session(&id, &session)?;
        Ok(id)
    }

    /// Username of a live session. Expired sessions are dropped on sight.
    pub fn resolve(&self, id: &str) -> Result<Option<String>, DatabaseError> {
        let session = match self.db.get_session(id)? {
            Some(session) => session,
            None => return Ok(None),
        };

        if session.is_expired(Utc::now()) {
            self.db.delete_session(id)?;
            return Ok(None);
        }
        Ok(Some(session.username))
    }

    pub fn destroy(&self, id: &str) -> Result<(), DatabaseError> {
        self.db.delete_session(id)?;
        Ok(())
    }

    pub fn purge_expired(&self) -> Result<u64, DatabaseError> {
        self.db.purge_expired_sessions(Utc::now())
    }

    /// Periodically delete expired sessions until the task is aborted
    pub async fn run_sweeper(self, every: Duration) {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let store = self.clone();
            match tokio::task::spawn_blocking(move || store.purge_expired()).await {
                Ok(Ok(0)) => {}
                Ok(Ok(removed)) => tracing::debug!(removed, "Swept expired sessions"),
                Ok(Err(e)) => tracing::error!(error = %e, "Failed to sweep sessions"),
                Err(e) => tracing::error!(error = %e, "Session sweeper task panicked"),
            }
        }
    }
}
