use serde::Serialize;

use super::classifier::RawPrediction;

const ELIGIBLE_LABELS: [&str; 4] = ["Y", "YES", "1", "TRUE"];
const NOT_ELIGIBLE_LABELS: [&str; 4] = ["N", "NO", "0", "FALSE"];

/// Human-facing interpretation of a raw classifier label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    Eligible,
    NotEligible,
    /// Label outside the known sets, resolved through the most probable class.
    Interpreted { raw: String, chosen: String },
    Raw { raw: String },
}

fn matches_any(label: &str, set: &[&str]) -> bool {
    let normalized = label.trim().to_ascii_uppercase();
    set.iter().any(|candidate| *candidate == normalized)
}

impl Verdict {
    pub fn from_prediction(prediction: &RawPrediction, classes: Option<&[String]>) -> Self {
        let label = prediction.label.as_str();
        if matches_any(label, &ELIGIBLE_LABELS) {
            return Verdict::Eligible;
        }
        if matches_any(label, &NOT_ELIGIBLE_LABELS) {
            return Verdict::NotEligible;
        }

        let chosen = prediction
            .probabilities
            .as_deref()
            .zip(classes)
            .and_then(|(probabilities, classes)| {
                argmax(probabilities).and_then(|idx| classes.get(idx))
            });

        match chosen {
            Some(chosen) => Verdict::Interpreted {
                raw: label.to_string(),
                chosen: chosen.clone(),
            },
            None => Verdict::Raw {
                raw: label.to_string(),
            },
        }
    }

    pub fn is_eligible(&self) -> bool {
        match self {
            Verdict::Eligible => true,
            Verdict::Interpreted { chosen, .. } => matches_any(chosen, &ELIGIBLE_LABELS),
            Verdict::NotEligible | Verdict::Raw { .. } => false,
        }
    }

    pub fn headline(&self) -> String {
        match self {
            Verdict::Eligible => "Loan Status is YES - You are Eligible".to_string(),
            Verdict::NotEligible => "Loan Status is NO - You are Not Eligible".to_string(),
            Verdict::Interpreted { raw, chosen } => {
                format!("Model raw: {raw} -> interpreted as {chosen}")
            }
            Verdict::Raw { raw } => format!("Model raw prediction: {raw}"),
        }
    }
}

/// First index of the largest finite probability.
fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, value)| value.is_finite())
        .fold(None, |best: Option<(usize, f64)>, (idx, value)| match best {
            Some((_, current)) if current >= *value => best,
            _ => Some((idx, *value)),
        })
        .map(|(idx, _)| idx)
}
