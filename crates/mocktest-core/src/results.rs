//! Scored results of a completed attempt.
//!
//! `TestResults` is derived and never patched: recompute it from a session
//! snapshot instead.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Answer, CorrectAnswer, QuestionKind, Subject};

/// How a single question was marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    /// Multi-correct: some correct options chosen, no wrong ones.
    Partial,
    Incorrect,
    Unanswered,
}

/// Per-question outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: u32,
    pub question_number: u32,
    pub subject: Subject,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub attempted: bool,
    pub outcome: Outcome,
    /// Marks awarded; negative for a penalty.
    pub marks_awarded: f64,
    pub max_marks: f64,
    /// Whole seconds spent on the question.
    pub time_spent_secs: u64,
    pub user_answer: Option<Answer>,
    pub correct_answer: CorrectAnswer,
}

/// Aggregate for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectResult {
    pub subject: Subject,
    pub total_questions: usize,
    pub attempted: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub partial_correct: usize,
    pub unanswered: usize,
    pub total_marks: f64,
    pub max_possible_marks: f64,
}

/// Whole-paper summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub total_questions: usize,
    pub attempted: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub partial_correct: usize,
    pub unanswered: usize,
    /// Net marks; may be negative.
    pub total_marks: f64,
    pub max_possible_marks: f64,
    /// `100 * total / max`, floored at 0.
    pub percentage: f64,
    /// Whole minutes of recorded question time.
    pub total_time_spent_minutes: u64,
}

/// A stored answer that could not be scored and was treated as unattempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringAnomaly {
    pub question_id: u32,
    pub question_number: u32,
    pub reason: String,
}

/// Complete scored results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResults {
    pub overall: OverallSummary,
    pub subject_wise: Vec<SubjectResult>,
    pub question_wise: Vec<QuestionResult>,
    #[serde(default)]
    pub anomalies: Vec<ScoringAnomaly>,
}

impl TestResults {
    /// Breakdown for `subject`, if the paper has any of its questions.
    pub fn subject(&self, subject: Subject) -> Option<&SubjectResult> {
        self.subject_wise.iter().find(|s| s.subject == subject)
    }

    /// Save the results as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize results")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        Ok(())
    }

    /// Load results from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read results from {}", path.display()))?;
        let results: TestResults =
            serde_json::from_str(&content).context("failed to parse results JSON")?;
        Ok(results)
    }

    /// Format the results as markdown.
    pub fn to_markdown(&self) -> String {
        let o = &self.overall;
        let mut md = String::new();

        md.push_str(&format!(
            "**Score:** {} / {} ({:.1}%)\n\n",
            fmt_marks(o.total_marks),
            fmt_marks(o.max_possible_marks),
            o.percentage
        ));
        md.push_str(&format!(
            "**Attempted:** {} of {} | correct {} | partial {} | incorrect {} | unanswered {} | {} min\n\n",
            o.attempted,
            o.total_questions,
            o.correct,
            o.partial_correct,
            o.incorrect,
            o.unanswered,
            o.total_time_spent_minutes
        ));

        if !self.subject_wise.is_empty() {
            md.push_str("### Subjects\n\n");
            md.push_str("| Subject | Marks | Attempted | Correct | Partial | Incorrect |\n");
            md.push_str("|---------|-------|-----------|---------|---------|-----------|\n");
            for s in &self.subject_wise {
                md.push_str(&format!(
                    "| {} | {} / {} | {}/{} | {} | {} | {} |\n",
                    s.subject,
                    fmt_marks(s.total_marks),
                    fmt_marks(s.max_possible_marks),
                    s.attempted,
                    s.total_questions,
                    s.correct,
                    s.partial_correct,
                    s.incorrect
                ));
            }
            md.push('\n');
        }

        if !self.anomalies.is_empty() {
            md.push_str("### Unscored answers\n\n");
            for a in &self.anomalies {
                md.push_str(&format!("- Q{}: {}\n", a.question_number, a.reason));
            }
        }

        md
    }
}

/// Marks without a trailing `.0` for whole values.
pub fn fmt_marks(marks: f64) -> String {
    if marks.fract() == 0.0 {
        format!("{marks:.0}")
    } else {
        format!("{marks:.2}")
    }
}

/// Results handed to the presentation layer once an attempt completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub attempt_id: Uuid,
    pub results: TestResults,
    /// Set when the timer expired rather than the candidate submitting.
    pub auto_submitted: bool,
    pub completed_at: DateTime<Utc>,
}
