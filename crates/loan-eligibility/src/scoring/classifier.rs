use serde::{Deserialize, Serialize};

use crate::encoder::FEATURE_COUNT;

/// Output of a single classifier invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<f64>>,
}

/// Pre-trained binary classifier. Loaded once and shared read-only across sessions.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Result<RawPrediction, ClassifierError>;

    /// Class labels aligned with the probability vector, when the model exposes them.
    fn classes(&self) -> Option<&[String]> {
        None
    }
}

impl<C: Classifier + ?Sized> Classifier for std::sync::Arc<C> {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Result<RawPrediction, ClassifierError> {
        (**self).predict(features)
    }

    fn classes(&self) -> Option<&[String]> {
        (**self).classes()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("model not loaded on server")]
    Unavailable,
    #[error("{0}")]
    Inference(String),
}

/// Stand-in used when the model artifact could not be loaded at start-up.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableClassifier;

impl Classifier for UnavailableClassifier {
    fn predict(&self, _features: &[f64; FEATURE_COUNT]) -> Result<RawPrediction, ClassifierError> {
        Err(ClassifierError::Unavailable)
    }
}
