//! Question set builder.
//!
//! Turns a per-subject range configuration plus an optional answer key into
//! an ordered question list. Missing or ill-fitting key entries never block a
//! test from starting under the default policy; they are substituted and
//! reported so the caller can show how many questions are affected.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::answer_key::AnswerKey;
use crate::error::{MockTestError, Result};
use crate::model::{CorrectAnswer, Question, QuestionKind, Subject};

/// One contiguous block of question numbers of a single type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    /// First question number, inclusive.
    pub start: u32,
    /// Last question number, inclusive.
    pub end: u32,
    #[serde(default = "default_marks")]
    pub marks: f64,
    #[serde(default)]
    pub negative_mark: f64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_marks() -> f64 {
    4.0
}

fn default_true() -> bool {
    true
}

impl RangeConfig {
    pub fn new(start: u32, end: u32, marks: f64, negative_mark: f64) -> Self {
        Self {
            start,
            end,
            marks,
            negative_mark,
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Number of questions this range contributes.
    pub fn len(&self) -> usize {
        if !self.enabled || self.end < self.start {
            0
        } else {
            (self.end - self.start) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An empty, disabled range; what an omitted section means.
impl Default for RangeConfig {
    fn default() -> Self {
        Self::new(1, 0, default_marks(), 0.0).disabled()
    }
}

/// The three typed sections of one subject. Omitted sections are disabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectConfig {
    pub single_correct: RangeConfig,
    pub multi_correct: RangeConfig,
    pub numerical: RangeConfig,
}

impl SubjectConfig {
    /// JEE Main layout for a subject whose first question is `first`.
    pub fn jee_main(first: u32) -> Self {
        Self {
            single_correct: RangeConfig::new(first, first + 19, 4.0, -1.0),
            multi_correct: RangeConfig::new(first + 20, first + 24, 4.0, -2.0),
            numerical: RangeConfig::new(first + 25, first + 29, 4.0, 0.0),
        }
    }

    pub fn range(&self, kind: QuestionKind) -> &RangeConfig {
        match kind {
            QuestionKind::SingleCorrect => &self.single_correct,
            QuestionKind::MultiCorrect => &self.multi_correct,
            QuestionKind::Numerical => &self.numerical,
        }
    }
}

/// Test layout consumed by [`build_question_set`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_duration")]
    pub duration_minutes: u64,
    #[serde(default)]
    pub physics: SubjectConfig,
    #[serde(default)]
    pub chemistry: SubjectConfig,
    #[serde(default)]
    pub mathematics: SubjectConfig,
}

fn default_name() -> String {
    "JEE Mock Test".to_string()
}

fn default_duration() -> u64 {
    180
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            duration_minutes: default_duration(),
            physics: SubjectConfig::jee_main(1),
            chemistry: SubjectConfig::jee_main(31),
            mathematics: SubjectConfig::jee_main(61),
        }
    }
}

impl TestConfig {
    pub fn subject(&self, subject: Subject) -> &SubjectConfig {
        match subject {
            Subject::Physics => &self.physics,
            Subject::Chemistry => &self.chemistry,
            Subject::Mathematics => &self.mathematics,
        }
    }

    /// Session length in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.duration_minutes.saturating_mul(60_000)
    }

    /// Total questions the enabled ranges would produce.
    pub fn expected_question_count(&self) -> usize {
        Subject::ALL
            .iter()
            .flat_map(|s| QuestionKind::ALL.iter().map(move |k| self.subject(*s).range(*k)))
            .map(RangeConfig::len)
            .sum()
    }

    /// Parse a TOML test layout.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("failed to parse test configuration TOML")
    }

    /// Load a TOML test layout from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read test configuration: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid test configuration: {}", path.display()))
    }
}

/// What to do when a generated question has no usable answer-key entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingKeyPolicy {
    /// Substitute the reference fallback and report the question number.
    #[default]
    Placeholder,
    /// Fail the build with [`MockTestError::MissingAnswerKey`].
    Strict,
}

/// Questions whose keyed answer was substituted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    /// No answer-key entry existed.
    pub placeholder_numbers: Vec<u32>,
    /// An entry existed but its shape did not fit the range's type.
    pub mismatched_numbers: Vec<u32>,
}

impl BuildReport {
    /// Count of questions with a substituted answer, for display.
    pub fn affected_count(&self) -> usize {
        self.placeholder_numbers.len() + self.mismatched_numbers.len()
    }
}

/// Builder output: the ordered questions and the substitution report.
#[derive(Debug, Clone)]
pub struct QuestionSet {
    pub questions: Vec<Question>,
    pub report: BuildReport,
}

/// Generate questions for every enabled range, sorted by question number.
///
/// Ids increase from 1 in subject order (physics, chemistry, mathematics),
/// then type order within a subject. Overlapping ranges are not merged.
pub fn build_question_set(
    config: &TestConfig,
    key: Option<&AnswerKey>,
    policy: MissingKeyPolicy,
) -> Result<QuestionSet> {
    let mut questions = Vec::with_capacity(config.expected_question_count());
    let mut report = BuildReport::default();
    let mut next_id = 1u32;

    for subject in Subject::ALL {
        let section = config.subject(subject);
        for kind in QuestionKind::ALL {
            let range = section.range(kind);
            if !range.enabled {
                continue;
            }
            if range.end < range.start {
                tracing::warn!(
                    "{subject} {kind} range {}..={} is empty, skipping",
                    range.start,
                    range.end
                );
                continue;
            }

            for number in range.start..=range.end {
                let correct_answer = match key.and_then(|k| k.get(number)) {
                    Some(answer) if answer.kind() == kind => answer.clone(),
                    Some(answer) => {
                        tracing::warn!(
                            "Q{number}: answer key entry '{answer}' does not fit a {kind} question"
                        );
                        report.mismatched_numbers.push(number);
                        CorrectAnswer::placeholder(kind)
                    }
                    None => {
                        report.placeholder_numbers.push(number);
                        CorrectAnswer::placeholder(kind)
                    }
                };

                questions.push(Question {
                    id: next_id,
                    number,
                    subject,
                    kind,
                    text: format!("Question {number}"),
                    options: kind.has_options().then(default_options),
                    correct_answer,
                    marks: range.marks,
                    negative_mark: range.negative_mark,
                });
                next_id += 1;
            }
        }
    }

    if questions.is_empty() {
        return Err(MockTestError::EmptyConfiguration);
    }

    if !report.placeholder_numbers.is_empty() {
        if policy == MissingKeyPolicy::Strict {
            let mut numbers = report.placeholder_numbers;
            numbers.extend(report.mismatched_numbers);
            numbers.sort_unstable();
            return Err(MockTestError::MissingAnswerKey { numbers });
        }
        tracing::warn!(
            "{} question(s) have no answer-key entry; using placeholder answers",
            report.placeholder_numbers.len()
        );
    } else if policy == MissingKeyPolicy::Strict && !report.mismatched_numbers.is_empty() {
        return Err(MockTestError::MissingAnswerKey {
            numbers: report.mismatched_numbers,
        });
    }

    // Stable: equal numbers keep generation order.
    questions.sort_by_key(|q| q.number);
    report.placeholder_numbers.sort_unstable();
    report.mismatched_numbers.sort_unstable();

    tracing::info!("generated {} questions", questions.len());
    Ok(QuestionSet { questions, report })
}

fn default_options() -> BTreeMap<String, String> {
    ["A", "B", "C", "D"]
        .iter()
        .map(|k| (k.to_string(), format!("Option {k}")))
        .collect()
}

/// A warning from question set validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question number (if applicable).
    pub number: Option<u32>,
    pub message: String,
}

/// Validate a question list for common issues.
pub fn validate_question_set(questions: &[Question]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    let mut seen_numbers = HashSet::new();
    for q in questions {
        if !seen_ids.insert(q.id) {
            warnings.push(ValidationWarning {
                number: Some(q.number),
                message: format!("duplicate question id: {}", q.id),
            });
        }
        if !seen_numbers.insert(q.number) {
            warnings.push(ValidationWarning {
                number: Some(q.number),
                message: format!("question number {} appears in overlapping ranges", q.number),
            });
        }
    }

    for q in questions {
        if q.correct_answer.kind() != q.kind {
            warnings.push(ValidationWarning {
                number: Some(q.number),
                message: format!(
                    "{} question keyed with a {} answer",
                    q.kind,
                    q.correct_answer.kind()
                ),
            });
        }
        if q.options.is_some() != q.kind.has_options() {
            warnings.push(ValidationWarning {
                number: Some(q.number),
                message: if q.kind.has_options() {
                    format!("{} question has no options", q.kind)
                } else {
                    "numerical question should not carry options".to_string()
                },
            });
        }
        if q.marks <= 0.0 {
            warnings.push(ValidationWarning {
                number: Some(q.number),
                message: format!("marks must be positive, got {}", q.marks),
            });
        }
    }

    warnings
}
