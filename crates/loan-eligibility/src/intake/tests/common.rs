use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::encoder::{CreditPolicy, FEATURE_COUNT};
use crate::intake::session::IntakeSession;
use crate::intake::store::{SessionId, SessionStore, SessionStoreError};
use crate::intake::{intake_router, IntakeService, QUESTION_COUNT};
use crate::scoring::{Classifier, ClassifierError, RawPrediction, ScoringService};

pub(super) const ANSWERS: [&str; QUESTION_COUNT] = [
    "Male", "Yes", "2", "Graduate", "No", "5000", "0", "100", "360", "900", "Urban",
];

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    sessions: Arc<Mutex<HashMap<SessionId, IntakeSession>>>,
}

impl MemoryStore {
    pub(super) fn get(&self, id: &SessionId) -> Option<IntakeSession> {
        self.sessions
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned()
    }
}

impl SessionStore for MemoryStore {
    fn insert(&self, id: SessionId, session: IntakeSession) -> Result<(), SessionStoreError> {
        let mut guard = self.sessions.lock().expect("store mutex poisoned");
        if guard.contains_key(&id) {
            return Err(SessionStoreError::Conflict);
        }
        guard.insert(id, session);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<IntakeSession>, SessionStoreError> {
        Ok(self.get(id))
    }

    fn save(&self, id: &SessionId, session: IntakeSession) -> Result<(), SessionStoreError> {
        let mut guard = self.sessions.lock().expect("store mutex poisoned");
        match guard.get_mut(id) {
            Some(existing) => {
                *existing = session;
                Ok(())
            }
            None => Err(SessionStoreError::NotFound),
        }
    }

    fn remove(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        self.sessions
            .lock()
            .expect("store mutex poisoned")
            .remove(id);
        Ok(())
    }
}

pub(super) struct UnavailableStore;

impl SessionStore for UnavailableStore {
    fn insert(&self, _id: SessionId, _session: IntakeSession) -> Result<(), SessionStoreError> {
        Err(SessionStoreError::Unavailable("cache offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<IntakeSession>, SessionStoreError> {
        Err(SessionStoreError::Unavailable("cache offline".to_string()))
    }

    fn save(&self, _id: &SessionId, _session: IntakeSession) -> Result<(), SessionStoreError> {
        Err(SessionStoreError::Unavailable("cache offline".to_string()))
    }

    fn remove(&self, _id: &SessionId) -> Result<(), SessionStoreError> {
        Err(SessionStoreError::Unavailable("cache offline".to_string()))
    }
}

/// Approves whenever the credit-history feature is set.
pub(super) struct CreditClassifier;

impl Classifier for CreditClassifier {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Result<RawPrediction, ClassifierError> {
        let label = if features[0] == 1.0 { "Y" } else { "N" };
        Ok(RawPrediction {
            label: label.to_string(),
            probabilities: None,
        })
    }
}

pub(super) struct BrokenClassifier;

impl Classifier for BrokenClassifier {
    fn predict(&self, _features: &[f64; FEATURE_COUNT]) -> Result<RawPrediction, ClassifierError> {
        Err(ClassifierError::Inference("shape mismatch".to_string()))
    }
}

pub(super) fn scoring<C: Classifier>(classifier: C) -> Arc<ScoringService<C>> {
    Arc::new(ScoringService::new(
        Arc::new(classifier),
        CreditPolicy::default(),
    ))
}

pub(super) fn build_service() -> (IntakeService<MemoryStore, CreditClassifier>, MemoryStore) {
    let store = MemoryStore::default();
    let service = IntakeService::new(Arc::new(store.clone()), scoring(CreditClassifier));
    (service, store)
}

pub(super) fn intake_router_with_service<C: Classifier + 'static>(
    service: IntakeService<MemoryStore, C>,
) -> axum::Router {
    intake_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
