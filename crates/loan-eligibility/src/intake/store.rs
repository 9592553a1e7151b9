use std::fmt;

use serde::{Deserialize, Serialize};

use super::session::IntakeSession;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage abstraction for conversation state so the web layer can pick its backing.
pub trait SessionStore: Send + Sync {
    fn insert(&self, id: SessionId, session: IntakeSession) -> Result<(), SessionStoreError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<IntakeSession>, SessionStoreError>;
    fn save(&self, id: &SessionId, session: IntakeSession) -> Result<(), SessionStoreError>;
    fn remove(&self, id: &SessionId) -> Result<(), SessionStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}
