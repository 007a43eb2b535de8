// src/sessions.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::assessment::AssessmentSession;

/// A live assessment plus hand-off bookkeeping.
#[derive(Debug)]
pub struct SessionEntry {
    pub session: AssessmentSession,
    /// The user whose result store entry holds this session's result, once saved.
    pub submitted_by: Option<String>,
    touched: Instant,
}

/// In-memory assessment sessions keyed by id.
///
/// Each session belongs to one user; entries idle longer than the TTL are
/// dropped the next time a session is created.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn insert(&self, id: Uuid, session: AssessmentSession) {
        let mut sessions = self.inner.lock().await;

        let ttl = self.ttl;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.touched.elapsed() < ttl);
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!("Pruned {} idle assessment sessions", pruned);
        }

        sessions.insert(
            id,
            SessionEntry {
                session,
                submitted_by: None,
                touched: Instant::now(),
            },
        );
    }

    /// Runs `f` against the session, or returns `None` if it does not exist.
    pub async fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut SessionEntry) -> R) -> Option<R> {
        let mut sessions = self.inner.lock().await;
        let entry = sessions.get_mut(&id)?;
        entry.touched = Instant::now();
        Some(f(entry))
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}
