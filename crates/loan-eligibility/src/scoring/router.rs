use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;
use tracing::warn;

use super::classifier::{Classifier, ClassifierError};
use super::service::ScoringService;
use crate::encoder::RawApplication;

/// Router exposing the one-shot prediction form.
pub fn prediction_router<C>(service: Arc<ScoringService<C>>) -> Router
where
    C: Classifier + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/predictions", post(predict_handler::<C>))
        .with_state(service)
}

pub(crate) async fn predict_handler<C>(
    State(service): State<Arc<ScoringService<C>>>,
    axum::Json(form): axum::Json<RawApplication>,
) -> Response
where
    C: Classifier + ?Sized + 'static,
{
    match service.score_form(&form) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(ClassifierError::Unavailable) => {
            warn!("prediction requested while model is unavailable");
            let payload = json!({
                "prediction_text": "Error: Model not loaded on server.",
                "error": ClassifierError::Unavailable.to_string(),
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        Err(other) => {
            warn!(error = %other, "prediction failed");
            let payload = json!({
                "prediction_text": format!("Error during prediction: {other}"),
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{CreditPolicy, FEATURE_COUNT};
    use crate::scoring::classifier::{RawPrediction, UnavailableClassifier};
    use serde_json::Value;
    use tower::ServiceExt;

    struct AlwaysApprove;

    impl Classifier for AlwaysApprove {
        fn predict(
            &self,
            _features: &[f64; FEATURE_COUNT],
        ) -> Result<RawPrediction, ClassifierError> {
            Ok(RawPrediction {
                label: "Y".to_string(),
                probabilities: Some(vec![0.1, 0.9]),
            })
        }
    }

    async fn read_json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn form_request(body: Value) -> axum::http::Request<axum::body::Body> {
        axum::http::Request::post("/api/v1/predictions")
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(
                serde_json::to_vec(&body).expect("serialize body"),
            ))
            .expect("request builds")
    }

    #[tokio::test]
    async fn prediction_route_returns_verdict_and_features() {
        let service = Arc::new(ScoringService::new(
            Arc::new(AlwaysApprove),
            CreditPolicy::default(),
        ));
        let router = prediction_router(service);

        let response = router
            .oneshot(form_request(json!({
                "Gender": "Male",
                "Married": "Yes",
                "Dependents": "3+",
                "ApplicantIncome": "5000",
                "LoanAmount": 120,
                "Loan_Amount_Term": "360",
                "Credit_History": "1",
                "Property_Area": "Semiurban",
            })))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(
            payload["prediction_text"],
            "Loan Status is YES - You are Eligible"
        );
        assert_eq!(payload["eligible"], true);
        assert_eq!(payload["raw_prediction"], "Y");
        assert_eq!(payload["features_sent"]["credit_history"], 1.0);
        assert_eq!(payload["features_sent"]["dependents_3_plus"], 1.0);
        assert_eq!(payload["features_sent"]["semiurban"], 1.0);
        assert_eq!(payload["probabilities"][1], 0.9);
    }

    #[tokio::test]
    async fn prediction_handler_reports_missing_model() {
        let service = Arc::new(ScoringService::new(
            Arc::new(UnavailableClassifier),
            CreditPolicy::default(),
        ));

        let response = predict_handler::<UnavailableClassifier>(
            State(service),
            axum::Json(RawApplication::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let payload = read_json_body(response).await;
        assert_eq!(
            payload["prediction_text"],
            "Error: Model not loaded on server."
        );
    }
}
