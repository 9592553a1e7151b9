use crate::encoder::CREDIT_SCORE_MAX;

/// How an answer to a question is validated and stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuestionKind {
    /// Free-text choice, accepted as-is.
    Choice,
    /// Household count such as `3+`, accepted as-is.
    Count,
    /// Any finite real number.
    Amount,
    /// Finite real number within an inclusive range.
    Score { min: f64, max: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionId {
    Gender,
    Married,
    Dependents,
    Education,
    SelfEmployed,
    ApplicantIncome,
    CoapplicantIncome,
    LoanAmount,
    LoanAmountTerm,
    CreditScore,
    PropertyArea,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: &'static str,
    pub kind: QuestionKind,
}

pub const QUESTION_COUNT: usize = 11;

/// Fixed interview order.
pub const QUESTIONS: [Question; QUESTION_COUNT] = [
    Question {
        id: QuestionId::Gender,
        prompt: "What is your Gender? (Male/Female)",
        kind: QuestionKind::Choice,
    },
    Question {
        id: QuestionId::Married,
        prompt: "Are you Married? (Yes/No)",
        kind: QuestionKind::Choice,
    },
    Question {
        id: QuestionId::Dependents,
        prompt: "How many Dependents do you have? (0/1/2/3+)",
        kind: QuestionKind::Count,
    },
    Question {
        id: QuestionId::Education,
        prompt: "What is your Education? (Graduate/Not Graduate)",
        kind: QuestionKind::Choice,
    },
    Question {
        id: QuestionId::SelfEmployed,
        prompt: "Are you Self Employed? (Yes/No)",
        kind: QuestionKind::Choice,
    },
    Question {
        id: QuestionId::ApplicantIncome,
        prompt: "Enter your Applicant Income:",
        kind: QuestionKind::Amount,
    },
    Question {
        id: QuestionId::CoapplicantIncome,
        prompt: "Enter your Coapplicant Income:",
        kind: QuestionKind::Amount,
    },
    Question {
        id: QuestionId::LoanAmount,
        prompt: "Enter Loan Amount:",
        kind: QuestionKind::Amount,
    },
    Question {
        id: QuestionId::LoanAmountTerm,
        prompt: "Enter Loan Amount Term (in days):",
        kind: QuestionKind::Amount,
    },
    Question {
        id: QuestionId::CreditScore,
        prompt: "Enter your Credit History score (300-850):",
        kind: QuestionKind::Score {
            min: 0.0,
            max: CREDIT_SCORE_MAX,
        },
    },
    Question {
        id: QuestionId::PropertyArea,
        prompt: "What is your Property Area? (Rural/Semiurban/Urban)",
        kind: QuestionKind::Choice,
    },
];

impl QuestionId {
    /// Position of the question in the interview; variants are declared in catalog order.
    pub const fn index(self) -> usize {
        self as usize
    }
}

pub fn question(index: usize) -> Option<&'static Question> {
    QUESTIONS.get(index)
}
