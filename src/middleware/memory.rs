use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use super::traits::{SessionStore, StoreError};
use crate::token::TokenRecord;
use crate::types::SessionId;

/// In-process session store with a fixed time-to-live.
///
/// A session's token disappears `ttl` after it was last written; this is the
/// only expiry the gate relies on. Suitable for a single instance; use a
/// shared cache behind [`SessionStore`] when running more than one.
#[derive(Debug)]
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<SessionId, Entry>>,
}

#[derive(Debug)]
struct Entry {
    written_at: Instant,
    token: TokenRecord,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of live sessions holding a token.
    pub fn len(&self) -> Result<usize, StoreError> {
        let guard = self
            .sessions
            .read()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        Ok(guard.values().filter(|e| !self.is_stale(e)).count())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        self.len().map(|n| n == 0)
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) -> Result<usize, StoreError> {
        let mut guard = self
            .sessions
            .write()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        let before = guard.len();
        guard.retain(|_, e| e.written_at.elapsed() < self.ttl);
        Ok(before - guard.len())
    }

    fn is_stale(&self, entry: &Entry) -> bool {
        entry.written_at.elapsed() >= self.ttl
    }
}

impl SessionStore for MemorySessionStore {
    async fn get(&self, session_id: &SessionId) -> Result<Option<TokenRecord>, StoreError> {
        {
            let guard = self
                .sessions
                .read()
                .map_err(|e| format!("Lock poisoned: {e}"))?;
            match guard.get(session_id) {
                None => return Ok(None),
                Some(entry) if !self.is_stale(entry) => return Ok(Some(entry.token.clone())),
                Some(_) => {}
            }
        }

        let mut guard = self
            .sessions
            .write()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        if guard.get(session_id).is_some_and(|e| self.is_stale(e)) {
            guard.remove(session_id);
            tracing::debug!(session_id = %session_id, "Session expired");
        }
        Ok(None)
    }

    async fn set(&self, session_id: &SessionId, token: TokenRecord) -> Result<(), StoreError> {
        let mut guard = self
            .sessions
            .write()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        guard.insert(
            session_id.clone(),
            Entry {
                written_at: Instant::now(),
                token,
            },
        );
        Ok(())
    }

    async fn remove(&self, session_id: &SessionId) -> Result<(), StoreError> {
        let mut guard = self
            .sessions
            .write()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        guard.remove(session_id);
        Ok(())
    }
}
