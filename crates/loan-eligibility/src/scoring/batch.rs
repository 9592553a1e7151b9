use std::io::{Read, Write};

use serde::Serialize;

use super::classifier::{Classifier, ClassifierError};
use super::verdict::Verdict;
use crate::encoder::{encode, ApplicantRecord, CreditPolicy, RawApplication};

const LOAN_ID_COLUMN: &str = "Loan_ID";

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("invalid applicant CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write batch output: {0}")]
    Io(#[from] std::io::Error),
    #[error("scoring failed on row {row}: {source}")]
    Scoring {
        row: usize,
        #[source]
        source: ClassifierError,
    },
}

/// One scored applicant in the batch output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub row: usize,
    pub loan_id: String,
    pub eligible: bool,
    pub prediction: String,
}

/// Totals reported once a batch completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub scored: usize,
    pub eligible: usize,
}

/// Scores every row of a loan dataset export and writes one outcome row per applicant.
pub fn score_csv<R, W, C>(
    reader: R,
    writer: W,
    classifier: &C,
    policy: &CreditPolicy,
) -> Result<BatchSummary, BatchError>
where
    R: Read,
    W: Write,
    C: Classifier + ?Sized,
{
    let mut input = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = input.headers()?.clone();
    let loan_id_idx = headers.iter().position(|header| header == LOAN_ID_COLUMN);

    let mut output = csv::Writer::from_writer(writer);
    let mut summary = BatchSummary::default();

    for (idx, record) in input.records().enumerate() {
        let record = record?;
        let row = idx + 1;
        let raw: RawApplication = record.deserialize(Some(&headers))?;
        let applicant = ApplicantRecord::from(&raw);
        let features = encode(&applicant, policy);

        let prediction = classifier
            .predict(&features.to_array())
            .map_err(|source| BatchError::Scoring { row, source })?;
        let verdict = Verdict::from_prediction(&prediction, classifier.classes());

        let outcome = BatchOutcome {
            row,
            loan_id: loan_id_idx
                .and_then(|position| record.get(position))
                .unwrap_or_default()
                .to_string(),
            eligible: verdict.is_eligible(),
            prediction: prediction.label,
        };

        summary.scored += 1;
        if outcome.eligible {
            summary.eligible += 1;
        }
        output.serialize(&outcome)?;
    }

    output.flush()?;
    Ok(summary)
}
