use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use loan_eligibility::error::AppError;
use loan_eligibility::intake::{intake_router, IntakeService, SessionStore};
use loan_eligibility::scoring::{prediction_router, score_csv, Classifier, ScoringService};
use tracing::info;

pub(crate) fn with_service_routes<S>(
    intake: Arc<IntakeService<S, dyn Classifier>>,
    scoring: Arc<ScoringService<dyn Classifier>>,
) -> axum::Router
where
    S: SessionStore + 'static,
{
    let batch = axum::Router::new()
        .route(
            "/api/v1/predictions/batch",
            axum::routing::post(batch_endpoint),
        )
        .with_state(scoring.clone());

    intake_router(intake)
        .merge(prediction_router(scoring))
        .merge(batch)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready", "model_loaded": state.model_loaded })
    } else {
        json!({ "status": "initializing", "model_loaded": state.model_loaded })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Scores a CSV export posted as the request body and answers with the outcome CSV.
pub(crate) async fn batch_endpoint(
    State(scoring): State<Arc<ScoringService<dyn Classifier>>>,
    body: String,
) -> Result<Response, AppError> {
    let mut output = Vec::new();
    let summary = score_csv(
        body.as_bytes(),
        &mut output,
        scoring.classifier(),
        scoring.policy(),
    )?;
    info!(
        scored = summary.scored,
        eligible = summary.eligible,
        "batch scoring completed"
    );

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        output,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemorySessionStore;
    use axum::body::Body;
    use axum::http::Request;
    use loan_eligibility::encoder::CreditPolicy;
    use loan_eligibility::scoring::{LogisticModel, UnavailableClassifier};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn bundled_model() -> Arc<dyn Classifier> {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../models/loan_model.json");
        Arc::new(LogisticModel::from_path(path).expect("bundled model loads"))
    }

    fn app(classifier: Arc<dyn Classifier>) -> axum::Router {
        let scoring: Arc<ScoringService<dyn Classifier>> =
            Arc::new(ScoringService::new(classifier, CreditPolicy::default()));
        let store = Arc::new(InMemorySessionStore::new(chrono::Duration::minutes(30)));
        let intake = Arc::new(IntakeService::new(store, scoring.clone()));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            model_loaded: true,
        };
        with_service_routes(intake, scoring).layer(Extension(state))
    }

    async fn read_body(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body")
            .to_vec()
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_reports_model_state() {
        let response = app(bundled_model())
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let payload: serde_json::Value =
            serde_json::from_slice(&read_body(response).await).expect("json");
        assert_eq!(payload["status"], "ready");
        assert_eq!(payload["model_loaded"], true);
    }

    #[tokio::test]
    async fn chat_and_prediction_routes_are_mounted() {
        let router = app(bundled_model());

        let response = router
            .clone()
            .oneshot(
                Request::post("/api/v1/chat/sessions")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .oneshot(
                Request::post("/api/v1/predictions")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"Credit_History": "1", "Married": "Yes"}"#))
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn batch_endpoint_returns_scored_csv() {
        let csv = "Loan_ID,Gender,Married,Dependents,Education,Self_Employed,ApplicantIncome,CoapplicantIncome,LoanAmount,Loan_Amount_Term,Credit_History,Property_Area\n\
LP001015,Male,Yes,0,Graduate,No,5720,0,110,360,1,Urban\n";
        let response = app(bundled_model())
            .oneshot(
                Request::post("/api/v1/predictions/batch")
                    .header(header::CONTENT_TYPE, "text/csv")
                    .body(Body::from(csv))
                    .expect("request"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let body = String::from_utf8(read_body(response).await).expect("utf8");
        assert!(body.starts_with("row,loan_id,eligible,prediction"));
        assert!(body.contains("1,LP001015,true,Y"));
    }

    #[tokio::test]
    async fn batch_endpoint_surfaces_scorer_failures() {
        let response = app(Arc::new(UnavailableClassifier))
            .oneshot(
                Request::post("/api/v1/predictions/batch")
                    .body(Body::from("Gender,Credit_History\nMale,1\n"))
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
