use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::classifier::{Classifier, ClassifierError, RawPrediction};
use crate::encoder::FEATURE_COUNT;

/// Serialized form of a fitted logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticArtifact {
    /// `[negative, positive]` class labels.
    pub classes: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// In-process logistic scorer over the 14-column feature vector.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    classes: Vec<String>,
    coefficients: [f64; FEATURE_COUNT],
    intercept: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid model artifact: {0}")]
    Json(#[from] serde_json::Error),
    #[error("model expects {expected} coefficients, artifact has {found}")]
    CoefficientCount { expected: usize, found: usize },
    #[error("model must declare exactly two classes, artifact has {found}")]
    ClassCount { found: usize },
    #[error("model artifact contains non-finite weights")]
    NonFiniteWeights,
}

impl LogisticModel {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelLoadError> {
        let artifact: LogisticArtifact = serde_json::from_reader(reader)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: LogisticArtifact) -> Result<Self, ModelLoadError> {
        let LogisticArtifact {
            classes,
            coefficients,
            intercept,
        } = artifact;

        if classes.len() != 2 {
            return Err(ModelLoadError::ClassCount {
                found: classes.len(),
            });
        }

        let found = coefficients.len();
        let coefficients: [f64; FEATURE_COUNT] =
            coefficients
                .try_into()
                .map_err(|_| ModelLoadError::CoefficientCount {
                    expected: FEATURE_COUNT,
                    found,
                })?;

        if !intercept.is_finite() || coefficients.iter().any(|weight| !weight.is_finite()) {
            return Err(ModelLoadError::NonFiniteWeights);
        }

        Ok(Self {
            classes,
            coefficients,
            intercept,
        })
    }

    /// Probability of the positive (second) class.
    pub fn positive_probability(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        let logit = self
            .coefficients
            .iter()
            .zip(features.iter())
            .fold(self.intercept, |acc, (weight, value)| acc + weight * value);
        1.0 / (1.0 + (-logit).exp())
    }
}

impl Classifier for LogisticModel {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Result<RawPrediction, ClassifierError> {
        if features.iter().any(|value| !value.is_finite()) {
            return Err(ClassifierError::Inference(
                "feature vector contains non-finite values".to_string(),
            ));
        }

        let positive = self.positive_probability(features);
        let label = if positive >= 0.5 {
            &self.classes[1]
        } else {
            &self.classes[0]
        };

        Ok(RawPrediction {
            label: label.clone(),
            probabilities: Some(vec![1.0 - positive, positive]),
        })
    }

    fn classes(&self) -> Option<&[String]> {
        Some(&self.classes)
    }
}
