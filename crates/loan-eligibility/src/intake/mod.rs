//! Guided loan interview: a fixed question catalog, per-conversation state, the pure
//! step controller, and the service/router pair that persists state between turns.

pub mod catalog;
pub mod controller;
pub mod router;
pub mod service;
pub mod session;
pub mod store;

#[cfg(test)]
mod tests;

pub use catalog::{Question, QuestionId, QuestionKind, QUESTIONS, QUESTION_COUNT};
pub use controller::{IntakeController, IntakeError, Reply, ReplyKind, Transition};
pub use router::{intake_router, ChatMessageRequest};
pub use service::{ConversationView, IntakeService, IntakeServiceError};
pub use session::{applicant_from_answers, Answer, ChatMessage, IntakeSession, IntakeStep, Role};
pub use store::{SessionId, SessionStore, SessionStoreError};
