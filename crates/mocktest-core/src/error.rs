//! Error types for the mock-test core.
//!
//! Configuration and navigation errors are returned to the caller. Scoring
//! anomalies and persistence failures are recoverable: the core logs them
//! and carries on with a neutral default.

use thiserror::Error;

use crate::model::QuestionKind;

/// Errors raised by the question builder, session store and controller.
#[derive(Debug, Error)]
pub enum MockTestError {
    /// The configuration would produce no questions.
    #[error("configuration produces no questions")]
    EmptyConfiguration,

    /// `initialize` was called on a live session without a reset.
    #[error("a session is already in progress; reset it before starting a new attempt")]
    AlreadyStarted,

    /// The answer's shape does not fit the question's type.
    #[error("question {question_id} expects a {expected} answer, got {found}")]
    InvalidAnswerShape {
        question_id: u32,
        expected: QuestionKind,
        found: &'static str,
    },

    /// Navigation target is outside the question list.
    #[error("index {index} is out of range for {len} questions")]
    IndexOutOfRange { index: usize, len: usize },

    /// A stored answer could not be scored (treated as unattempted).
    #[error("malformed answer for question {question_id}: {reason}")]
    MalformedAnswer { question_id: u32, reason: String },

    /// Writing to or reading from the persistence store failed.
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    /// No question with this id or number exists in the session.
    #[error("unknown question: {0}")]
    UnknownQuestion(u32),

    /// The session is not in the in-progress phase.
    #[error("session is {phase}, not in progress")]
    NotInProgress { phase: &'static str },

    /// Strict builder policy: some generated questions have no answer-key entry.
    #[error("no answer-key entry for question numbers {numbers:?}")]
    MissingAnswerKey { numbers: Vec<u32> },
}

impl MockTestError {
    /// Returns `true` for anomalies the core recovers from locally.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MockTestError::MalformedAnswer { .. } | MockTestError::PersistenceFailure(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MockTestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_classification() {
        assert!(MockTestError::PersistenceFailure("disk full".into()).is_recoverable());
        assert!(MockTestError::MalformedAnswer {
            question_id: 3,
            reason: "NaN".into()
        }
        .is_recoverable());
        assert!(!MockTestError::AlreadyStarted.is_recoverable());
        assert!(!MockTestError::IndexOutOfRange { index: 9, len: 3 }.is_recoverable());
    }

    #[test]
    fn messages_name_the_question() {
        let err = MockTestError::InvalidAnswerShape {
            question_id: 7,
            expected: QuestionKind::Numerical,
            found: "single option",
        };
        assert_eq!(
            err.to_string(),
            "question 7 expects a numerical answer, got single option"
        );
    }
}
