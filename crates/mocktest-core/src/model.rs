//! Core data model types for mocktest.
//!
//! Questions are immutable once generated. Candidate responses are a tagged
//! [`Answer`] matched exhaustively by the scoring engine.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MockTestError, Result};

/// Exam subject.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    #[default]
    Physics,
    Chemistry,
    #[serde(alias = "maths")]
    Mathematics,
}

impl Subject {
    /// All subjects in paper order.
    pub const ALL: [Subject; 3] = [Subject::Physics, Subject::Chemistry, Subject::Mathematics];
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Physics => write!(f, "physics"),
            Subject::Chemistry => write!(f, "chemistry"),
            Subject::Mathematics => write!(f, "mathematics"),
        }
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "physics" | "phy" => Ok(Subject::Physics),
            "chemistry" | "chem" => Ok(Subject::Chemistry),
            "mathematics" | "maths" | "math" => Ok(Subject::Mathematics),
            other => Err(format!("unknown subject: {other}")),
        }
    }
}

/// How a question is answered and marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    #[serde(alias = "mcq")]
    SingleCorrect,
    MultiCorrect,
    Numerical,
}

impl QuestionKind {
    /// All kinds in the order a subject section lays them out.
    pub const ALL: [QuestionKind; 3] = [
        QuestionKind::SingleCorrect,
        QuestionKind::MultiCorrect,
        QuestionKind::Numerical,
    ];

    /// Whether questions of this kind present lettered options.
    pub fn has_options(self) -> bool {
        !matches!(self, QuestionKind::Numerical)
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::SingleCorrect => write!(f, "single-correct"),
            QuestionKind::MultiCorrect => write!(f, "multi-correct"),
            QuestionKind::Numerical => write!(f, "numerical"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single-correct" | "single" | "mcq" => Ok(QuestionKind::SingleCorrect),
            "multi-correct" | "multi" | "multiple" => Ok(QuestionKind::MultiCorrect),
            "numerical" | "numeric" | "integer" => Ok(QuestionKind::Numerical),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// The keyed answer for a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CorrectAnswer {
    Single(String),
    Multi(BTreeSet<String>),
    Numerical(f64),
}

impl CorrectAnswer {
    /// The question kind this answer shape belongs to.
    pub fn kind(&self) -> QuestionKind {
        match self {
            CorrectAnswer::Single(_) => QuestionKind::SingleCorrect,
            CorrectAnswer::Multi(_) => QuestionKind::MultiCorrect,
            CorrectAnswer::Numerical(_) => QuestionKind::Numerical,
        }
    }

    /// Reference fallback used when the answer key has no entry.
    pub fn placeholder(kind: QuestionKind) -> Self {
        match kind {
            QuestionKind::SingleCorrect => CorrectAnswer::Single("A".into()),
            QuestionKind::MultiCorrect => {
                CorrectAnswer::Multi(["A", "B"].iter().map(|s| s.to_string()).collect())
            }
            QuestionKind::Numerical => CorrectAnswer::Numerical(0.0),
        }
    }
}

impl fmt::Display for CorrectAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectAnswer::Single(key) => write!(f, "{key}"),
            CorrectAnswer::Multi(keys) => {
                let joined: Vec<&str> = keys.iter().map(String::as_str).collect();
                write!(f, "{}", joined.join(","))
            }
            CorrectAnswer::Numerical(value) => write!(f, "{value}"),
        }
    }
}

/// A candidate's response to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Single(String),
    Multi(BTreeSet<String>),
    Numerical(f64),
    Unanswered,
}

impl Answer {
    /// Build a multi-correct answer from option keys.
    pub fn multi<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Answer::Multi(keys.into_iter().map(Into::into).collect())
    }

    /// Short description of the shape, used in diagnostics.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Answer::Single(_) => "single option",
            Answer::Multi(_) => "option set",
            Answer::Numerical(_) => "number",
            Answer::Unanswered => "no answer",
        }
    }

    /// A blank string, an empty set or no response at all.
    pub fn is_blank(&self) -> bool {
        match self {
            Answer::Single(key) => key.trim().is_empty(),
            Answer::Multi(keys) => keys.is_empty(),
            Answer::Numerical(_) => false,
            Answer::Unanswered => true,
        }
    }

    /// Whether this response may be stored against a question of `kind`.
    pub fn fits(&self, kind: QuestionKind) -> bool {
        match self {
            Answer::Single(_) => kind == QuestionKind::SingleCorrect,
            Answer::Multi(_) => kind == QuestionKind::MultiCorrect,
            Answer::Numerical(_) => kind == QuestionKind::Numerical,
            Answer::Unanswered => true,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Single(key) => write!(f, "{key}"),
            Answer::Multi(keys) => {
                let joined: Vec<&str> = keys.iter().map(String::as_str).collect();
                write!(f, "{}", joined.join(","))
            }
            Answer::Numerical(value) => write!(f, "{value}"),
            Answer::Unanswered => write!(f, "-"),
        }
    }
}

/// A single generated question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique, stable identifier.
    pub id: u32,
    /// 1-based display number; ordering key.
    pub number: u32,
    pub subject: Subject,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub text: String,
    /// Option key to option text. Present iff the kind has options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<String, String>>,
    pub correct_answer: CorrectAnswer,
    /// Reward for full credit.
    pub marks: f64,
    /// Penalty on an incorrect attempt (usually negative or zero).
    pub negative_mark: f64,
}

impl Question {
    /// Checks that the keyed answer and options agree with the question kind.
    pub fn is_consistent(&self) -> bool {
        self.correct_answer.kind() == self.kind && self.options.is_some() == self.kind.has_options()
    }

    /// Interpret raw candidate input for this question's kind.
    ///
    /// Option keys are trimmed and upper-cased; multi-correct input is a
    /// comma-separated list. Blank input yields [`Answer::Unanswered`].
    pub fn parse_answer(&self, raw: &str) -> Result<Answer> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Answer::Unanswered);
        }
        match self.kind {
            QuestionKind::SingleCorrect => {
                if raw.contains(',') {
                    return Err(MockTestError::InvalidAnswerShape {
                        question_id: self.id,
                        expected: self.kind,
                        found: "option set",
                    });
                }
                Ok(Answer::Single(raw.to_uppercase()))
            }
            QuestionKind::MultiCorrect => Ok(Answer::multi(
                raw.split(',')
                    .map(|k| k.trim().to_uppercase())
                    .filter(|k| !k.is_empty()),
            )),
            QuestionKind::Numerical => match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Answer::Numerical(value)),
                _ => Err(MockTestError::InvalidAnswerShape {
                    question_id: self.id,
                    expected: self.kind,
                    found: "text",
                }),
            },
        }
    }
}
