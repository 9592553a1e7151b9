use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::QuestionId;
use crate::encoder::{lenient_number, ApplicantRecord};

/// Position in the interview. `NotStarted` is reported as `-1` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum IntakeStep {
    NotStarted,
    /// Index of the question most recently asked.
    Question(usize),
}

impl IntakeStep {
    pub fn as_index(self) -> i64 {
        match self {
            IntakeStep::NotStarted => -1,
            IntakeStep::Question(idx) => idx as i64,
        }
    }
}

/// An answer, typed by the kind of question it was given for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Text(String),
    Amount(f64),
    Score(f64),
    /// Failed validation; replaced by the next submission for the same question.
    Rejected(String),
}

impl Answer {
    fn text(&self) -> String {
        match self {
            Answer::Text(text) | Answer::Rejected(text) => text.clone(),
            Answer::Amount(value) | Answer::Score(value) => value.to_string(),
        }
    }

    fn number(&self) -> f64 {
        match self {
            Answer::Amount(value) | Answer::Score(value) => *value,
            Answer::Text(text) | Answer::Rejected(text) => lenient_number(text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Per-conversation state. Only [`super::IntakeController`] produces new states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeSession {
    pub(crate) step: IntakeStep,
    pub(crate) answers: BTreeMap<usize, Answer>,
    pub(crate) transcript: Vec<ChatMessage>,
}

impl IntakeSession {
    pub(crate) fn new() -> Self {
        Self {
            step: IntakeStep::NotStarted,
            answers: BTreeMap::new(),
            transcript: Vec::new(),
        }
    }

    pub fn step(&self) -> IntakeStep {
        self.step
    }

    pub fn answers(&self) -> &BTreeMap<usize, Answer> {
        &self.answers
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub(crate) fn push(&mut self, role: Role, content: impl Into<String>) {
        self.transcript.push(ChatMessage {
            role,
            content: content.into(),
        });
    }

    pub(crate) fn reset_progress(&mut self) {
        self.step = IntakeStep::NotStarted;
        self.answers.clear();
    }
}

/// Builds the encoder input from collected answers, filling gaps with neutral defaults.
pub fn applicant_from_answers(answers: &BTreeMap<usize, Answer>) -> ApplicantRecord {
    let text = |id: QuestionId, default: &str| {
        answers
            .get(&id.index())
            .map(Answer::text)
            .unwrap_or_else(|| default.to_string())
    };
    let number = |id: QuestionId| answers.get(&id.index()).map_or(0.0, Answer::number);

    ApplicantRecord {
        gender: text(QuestionId::Gender, ""),
        married: text(QuestionId::Married, ""),
        dependents: text(QuestionId::Dependents, "0"),
        education: text(QuestionId::Education, "Graduate"),
        self_employed: text(QuestionId::SelfEmployed, "No"),
        applicant_income: number(QuestionId::ApplicantIncome),
        coapplicant_income: number(QuestionId::CoapplicantIncome),
        loan_amount: number(QuestionId::LoanAmount),
        loan_amount_term: number(QuestionId::LoanAmountTerm),
        credit: number(QuestionId::CreditScore),
        property_area: text(QuestionId::PropertyArea, "Urban"),
    }
}
