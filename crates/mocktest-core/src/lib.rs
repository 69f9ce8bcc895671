//! mocktest-core: question sets, session state, timing and scoring for
//! JEE-style mock tests.
//!
//! The flow is builder → session store → controller → scoring engine. The
//! controller is the only entry point a UI layer needs; the other modules
//! are public for hosts that compose them differently.

pub mod answer_key;
pub mod builder;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod persistence;
pub mod results;
pub mod scoring;
pub mod session;
pub mod timer;

pub use answer_key::AnswerKey;
pub use builder::{build_question_set, MissingKeyPolicy, QuestionSet, TestConfig};
pub use controller::{ExamController, Phase, TickOutcome};
pub use error::{MockTestError, Result};
pub use model::{Answer, CorrectAnswer, Question, QuestionKind, Subject};
pub use results::{Submission, TestResults};
pub use scoring::{score, Scorer, ScoringPolicy};
pub use session::{SessionSnapshot, SessionState, SessionStore};
