use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::controller::{IntakeController, IntakeError, Reply, ReplyKind, Transition};
use super::session::{ChatMessage, IntakeSession};
use super::store::{SessionId, SessionStore, SessionStoreError};
use crate::scoring::{Classifier, ScoringService};

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let nonce = RandomState::new().hash_one(id);
    SessionId(format!("chat-{id:06}-{nonce:016x}"))
}

/// Snapshot returned to callers after every conversational turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationView {
    pub session_id: SessionId,
    pub reply: String,
    pub kind: ReplyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible: Option<bool>,
    pub step: i64,
    pub messages: Vec<ChatMessage>,
}

impl ConversationView {
    fn new(session_id: SessionId, session: &IntakeSession, reply: Reply) -> Self {
        Self {
            session_id,
            reply: reply.text,
            kind: reply.kind,
            eligible: reply.eligible,
            step: session.step().as_index(),
            messages: session.transcript().to_vec(),
        }
    }
}

/// Loads a conversation, applies one controller transition, and stores the result.
pub struct IntakeService<S, C: ?Sized> {
    store: Arc<S>,
    controller: IntakeController<C>,
}

impl<S, C> IntakeService<S, C>
where
    S: SessionStore + 'static,
    C: Classifier + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, scoring: Arc<ScoringService<C>>) -> Self {
        Self {
            store,
            controller: IntakeController::new(scoring),
        }
    }

    /// Begin a new conversation.
    pub fn open(&self) -> Result<ConversationView, IntakeServiceError> {
        let id = next_session_id();
        let Transition { session, reply } = self.controller.start();
        let view = ConversationView::new(id.clone(), &session, reply);
        self.store.insert(id.clone(), session)?;
        info!(session_id = %id, "chat session opened");
        Ok(view)
    }

    /// Apply one user message to an existing conversation.
    pub fn reply(
        &self,
        id: &SessionId,
        message: &str,
    ) -> Result<ConversationView, IntakeServiceError> {
        let current = self
            .store
            .fetch(id)?
            .ok_or_else(|| IntakeServiceError::SessionNotFound(id.clone()))?;

        let Transition { session, reply } = self.controller.submit(&current, message)?;
        if reply.kind == ReplyKind::Verdict {
            info!(session_id = %id, eligible = ?reply.eligible, "chat interview completed");
        }

        let view = ConversationView::new(id.clone(), &session, reply);
        self.store.save(id, session)?;
        Ok(view)
    }

    /// Discard progress and transcript, starting the interview over under the same id.
    pub fn restart(&self, id: &SessionId) -> Result<ConversationView, IntakeServiceError> {
        if self.store.fetch(id)?.is_none() {
            return Err(IntakeServiceError::SessionNotFound(id.clone()));
        }

        let Transition { session, reply } = self.controller.start();
        let view = ConversationView::new(id.clone(), &session, reply);
        self.store.save(id, session)?;
        Ok(view)
    }

    /// Forget a conversation entirely.
    pub fn close(&self, id: &SessionId) -> Result<(), IntakeServiceError> {
        if self.store.fetch(id)?.is_none() {
            return Err(IntakeServiceError::SessionNotFound(id.clone()));
        }
        self.store.remove(id)?;
        info!(session_id = %id, "chat session closed");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error("chat session {0} not found")]
    SessionNotFound(SessionId),
    #[error(transparent)]
    Store(#[from] SessionStoreError),
}
