use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::controller::ReplyKind;
use super::service::{IntakeService, IntakeServiceError};
use super::store::{SessionId, SessionStore, SessionStoreError};
use crate::scoring::Classifier;

#[derive(Debug, Deserialize)]
pub struct ChatMessageRequest {
    #[serde(default)]
    pub message: String,
}

/// Router builder exposing the guided chat interview.
pub fn intake_router<S, C>(service: Arc<IntakeService<S, C>>) -> Router
where
    S: SessionStore + 'static,
    C: Classifier + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/chat/sessions", post(open_handler::<S, C>))
        .route(
            "/api/v1/chat/sessions/:session_id",
            delete(close_handler::<S, C>),
        )
        .route(
            "/api/v1/chat/sessions/:session_id/messages",
            post(message_handler::<S, C>),
        )
        .route(
            "/api/v1/chat/sessions/:session_id/restart",
            post(restart_handler::<S, C>),
        )
        .with_state(service)
}

fn error_response(error: IntakeServiceError) -> Response {
    let status = match &error {
        IntakeServiceError::Intake(_) => StatusCode::BAD_REQUEST,
        IntakeServiceError::SessionNotFound(_)
        | IntakeServiceError::Store(SessionStoreError::NotFound) => StatusCode::NOT_FOUND,
        IntakeServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "status": "error",
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn open_handler<S, C>(
    State(service): State<Arc<IntakeService<S, C>>>,
) -> Response
where
    S: SessionStore + 'static,
    C: Classifier + ?Sized + 'static,
{
    match service.open() {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn message_handler<S, C>(
    State(service): State<Arc<IntakeService<S, C>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<ChatMessageRequest>,
) -> Response
where
    S: SessionStore + 'static,
    C: Classifier + ?Sized + 'static,
{
    let id = SessionId(session_id);
    match service.reply(&id, &request.message) {
        Ok(view) => {
            let status = if view.kind == ReplyKind::ScoringError {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::OK
            };
            (status, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn restart_handler<S, C>(
    State(service): State<Arc<IntakeService<S, C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    C: Classifier + ?Sized + 'static,
{
    let id = SessionId(session_id);
    match service.restart(&id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn close_handler<S, C>(
    State(service): State<Arc<IntakeService<S, C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    C: Classifier + ?Sized + 'static,
{
    let id = SessionId(session_id);
    match service.close(&id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}
