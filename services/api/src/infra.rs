use chrono::{DateTime, Duration, Utc};
use loan_eligibility::intake::{IntakeSession, SessionId, SessionStore, SessionStoreError};
use loan_eligibility::scoring::{Classifier, LogisticModel, UnavailableClassifier};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) model_loaded: bool,
}

#[derive(Debug, Clone)]
struct StoredSession {
    session: IntakeSession,
    touched_at: DateTime<Utc>,
}

/// Process-local chat sessions. Entries idle for longer than the TTL are dropped on access.
#[derive(Clone)]
pub(crate) struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, StoredSession>>>,
    ttl: Duration,
    clock: fn() -> DateTime<Utc>,
}

impl InMemorySessionStore {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Utc::now)
    }

    pub(crate) fn with_clock(ttl: Duration, clock: fn() -> DateTime<Utc>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    fn is_expired(&self, stored: &StoredSession, now: DateTime<Utc>) -> bool {
        now - stored.touched_at > self.ttl
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.lock().expect("session mutex poisoned").len()
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, id: SessionId, session: IntakeSession) -> Result<(), SessionStoreError> {
        let now = (self.clock)();
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        guard.retain(|_, stored| !self.is_expired(stored, now));
        if guard.contains_key(&id) {
            return Err(SessionStoreError::Conflict);
        }
        guard.insert(
            id,
            StoredSession {
                session,
                touched_at: now,
            },
        );
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<IntakeSession>, SessionStoreError> {
        let now = (self.clock)();
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        match guard.get(id) {
            Some(stored) if self.is_expired(stored, now) => {
                guard.remove(id);
                Ok(None)
            }
            Some(stored) => Ok(Some(stored.session.clone())),
            None => Ok(None),
        }
    }

    fn save(&self, id: &SessionId, session: IntakeSession) -> Result<(), SessionStoreError> {
        let now = (self.clock)();
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        match guard.get_mut(id) {
            Some(stored) => {
                stored.session = session;
                stored.touched_at = now;
                Ok(())
            }
            None => Err(SessionStoreError::NotFound),
        }
    }

    fn remove(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        guard.remove(id);
        Ok(())
    }
}

/// Loads the classifier artifact, falling back to a scorer that reports itself unavailable.
pub(crate) fn load_classifier(path: &Path) -> (Arc<dyn Classifier>, bool) {
    match LogisticModel::from_path(path) {
        Ok(model) => {
            info!(path = %path.display(), "loan model loaded");
            (Arc::new(model), true)
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "loan model not loaded");
            (Arc::new(UnavailableClassifier), false)
        }
    }
}
