use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::catalog::{question, QuestionKind, QUESTIONS, QUESTION_COUNT};
use super::session::{applicant_from_answers, Answer, IntakeSession, IntakeStep, Role};
use crate::scoring::{Classifier, ScoringService};

pub const GREETING: &str = "Hello! I'm your loan eligibility assistant. Type 'Yes' to begin.";
pub const READY_PROMPT: &str = "Type 'Yes' when you're ready to begin.";
pub const INVALID_NUMBER: &str = "Please enter a valid number for this question.";
pub const INVALID_CREDIT_NUMBER: &str = "Please enter a valid number for credit score.";
pub const CREDIT_OUT_OF_RANGE: &str = "Credit score must be between 0 and 1000.";

pub const ELIGIBLE_VERDICT: &str =
    "Congratulations! Based on the provided info you appear eligible for the loan.";
pub const NOT_ELIGIBLE_VERDICT: &str = "Based on the provided info you appear NOT eligible. \
Consider improving credit, decreasing requested amount, or adding a co-applicant.";
pub const ELIGIBLE_ADVICE: &str =
    "Next steps: prepare ID, income proofs, property docs if needed, then contact lender.";
pub const NOT_ELIGIBLE_ADVICE: &str = "Recommendations: increase credit score, reduce loan \
amount, increase income or add co-applicant.";

const AFFIRMATIVE: [&str; 3] = ["yes", "y", "ready"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Greeting,
    Question,
    Reprompt,
    Verdict,
    ScoringError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub kind: ReplyKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible: Option<bool>,
}

impl Reply {
    fn new(kind: ReplyKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            eligible: None,
        }
    }
}

/// New session state together with the assistant's reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub session: IntakeSession,
    pub reply: Reply,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("Empty message")]
    EmptyInput,
}

/// Why an answer was refused for the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    NotANumber,
    ScoreNotANumber,
    ScoreOutOfRange,
}

impl Rejection {
    fn message(self) -> &'static str {
        match self {
            Rejection::NotANumber => INVALID_NUMBER,
            Rejection::ScoreNotANumber => INVALID_CREDIT_NUMBER,
            Rejection::ScoreOutOfRange => CREDIT_OUT_OF_RANGE,
        }
    }
}

fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn validate(kind: QuestionKind, text: &str) -> Result<Answer, Rejection> {
    match kind {
        QuestionKind::Choice | QuestionKind::Count => Ok(Answer::Text(text.to_string())),
        QuestionKind::Amount => parse_finite(text)
            .map(Answer::Amount)
            .ok_or(Rejection::NotANumber),
        QuestionKind::Score { min, max } => {
            let score = parse_finite(text).ok_or(Rejection::ScoreNotANumber)?;
            if (min..=max).contains(&score) {
                Ok(Answer::Score(score))
            } else {
                Err(Rejection::ScoreOutOfRange)
            }
        }
    }
}

/// Step-indexed questionnaire. Each call maps `(state, input)` to a new state and a reply;
/// the controller never holds conversation state itself.
pub struct IntakeController<C: ?Sized> {
    scoring: Arc<ScoringService<C>>,
}

impl<C> IntakeController<C>
where
    C: Classifier + ?Sized,
{
    pub fn new(scoring: Arc<ScoringService<C>>) -> Self {
        Self { scoring }
    }

    pub fn start(&self) -> Transition {
        let mut session = IntakeSession::new();
        session.push(Role::Assistant, GREETING);
        Transition {
            session,
            reply: Reply::new(ReplyKind::Greeting, GREETING),
        }
    }

    pub fn submit(&self, session: &IntakeSession, raw: &str) -> Result<Transition, IntakeError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(IntakeError::EmptyInput);
        }

        let mut next = session.clone();
        next.push(Role::User, raw);

        let reply = match next.step {
            IntakeStep::NotStarted => Self::confirm(&mut next, text),
            IntakeStep::Question(idx) => self.answer(&mut next, idx, text),
        };

        debug!(step = next.step.as_index(), kind = ?reply.kind, "intake transition");
        Ok(Transition {
            session: next,
            reply,
        })
    }

    fn confirm(session: &mut IntakeSession, text: &str) -> Reply {
        let affirmative = AFFIRMATIVE
            .iter()
            .any(|word| text.eq_ignore_ascii_case(word));
        if !affirmative {
            session.push(Role::Assistant, READY_PROMPT);
            return Reply::new(ReplyKind::Reprompt, READY_PROMPT);
        }

        session.step = IntakeStep::Question(0);
        let prompt = QUESTIONS[0].prompt;
        session.push(Role::Assistant, prompt);
        Reply::new(ReplyKind::Question, prompt)
    }

    fn answer(&self, session: &mut IntakeSession, idx: usize, text: &str) -> Reply {
        let Some(current) = question(idx) else {
            warn!(step = idx, "session step outside the catalog, restarting interview");
            session.reset_progress();
            session.push(Role::Assistant, READY_PROMPT);
            return Reply::new(ReplyKind::Reprompt, READY_PROMPT);
        };

        match validate(current.kind, text) {
            Ok(answer) => {
                session.answers.insert(idx, answer);
            }
            Err(rejection) => {
                session.answers.insert(idx, Answer::Rejected(text.to_string()));
                session.push(Role::Assistant, rejection.message());
                return Reply::new(ReplyKind::Reprompt, rejection.message());
            }
        }

        let next_idx = idx + 1;
        if next_idx < QUESTION_COUNT {
            session.step = IntakeStep::Question(next_idx);
            let prompt = QUESTIONS[next_idx].prompt;
            session.push(Role::Assistant, prompt);
            return Reply::new(ReplyKind::Question, prompt);
        }

        self.conclude(session)
    }

    /// Scores a completed questionnaire. On failure the step stays on the final question so
    /// the caller can resubmit.
    fn conclude(&self, session: &mut IntakeSession) -> Reply {
        let applicant = applicant_from_answers(&session.answers);
        match self.scoring.score(&applicant) {
            Ok(report) => {
                let (verdict, advice) = if report.eligible {
                    (ELIGIBLE_VERDICT, ELIGIBLE_ADVICE)
                } else {
                    (NOT_ELIGIBLE_VERDICT, NOT_ELIGIBLE_ADVICE)
                };
                session.push(Role::Assistant, verdict);
                session.push(Role::Assistant, advice);
                session.reset_progress();

                Reply {
                    kind: ReplyKind::Verdict,
                    text: format!("{verdict}\n\n{advice}"),
                    eligible: Some(report.eligible),
                }
            }
            Err(err) => {
                warn!(error = %err, "intake scoring failed");
                let text = format!("Error processing prediction: {err}");
                session.push(Role::Assistant, text.clone());
                Reply::new(ReplyKind::ScoringError, text)
            }
        }
    }
}
