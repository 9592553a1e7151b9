//! Classifier boundary: the opaque scorer trait, the label-to-verdict mapping, and the
//! adapters (JSON-backed logistic model, CSV batch scoring, HTTP prediction form) built on it.

pub mod batch;
pub mod classifier;
pub mod model;
pub mod router;
pub mod service;
pub mod verdict;

pub use batch::{score_csv, BatchError, BatchOutcome, BatchSummary};
pub use classifier::{Classifier, ClassifierError, RawPrediction, UnavailableClassifier};
pub use model::{LogisticArtifact, LogisticModel, ModelLoadError};
pub use router::prediction_router;
pub use service::{PredictionReport, ScoringService};
pub use verdict::Verdict;
