use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::classifier::{Classifier, ClassifierError};
use super::verdict::Verdict;
use crate::encoder::{encode, ApplicantRecord, CreditPolicy, FeatureVector, RawApplication};

/// Result of scoring one complete application form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub prediction_text: String,
    pub eligible: bool,
    pub verdict: Verdict,
    pub features_sent: FeatureVector,
    pub raw_prediction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<f64>>,
}

/// Encodes applicant data and runs it through the shared classifier.
pub struct ScoringService<C: ?Sized> {
    policy: CreditPolicy,
    classifier: Arc<C>,
}

impl<C> ScoringService<C>
where
    C: Classifier + ?Sized,
{
    pub fn new(classifier: Arc<C>, policy: CreditPolicy) -> Self {
        Self { policy, classifier }
    }

    pub fn policy(&self) -> &CreditPolicy {
        &self.policy
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn score_form(&self, form: &RawApplication) -> Result<PredictionReport, ClassifierError> {
        self.score(&ApplicantRecord::from(form))
    }

    pub fn score(&self, applicant: &ApplicantRecord) -> Result<PredictionReport, ClassifierError> {
        let features = encode(applicant, &self.policy);
        let prediction = self.classifier.predict(&features.to_array())?;
        let verdict = Verdict::from_prediction(&prediction, self.classifier.classes());
        let eligible = verdict.is_eligible();

        info!(
            eligible,
            label = %prediction.label,
            "loan application scored"
        );

        Ok(PredictionReport {
            prediction_text: verdict.headline(),
            eligible,
            verdict,
            features_sent: features,
            raw_prediction: prediction.label,
            probabilities: prediction.probabilities,
        })
    }
}
