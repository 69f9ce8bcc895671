//! Marking policies and the scoring engine.
//!
//! Scoring is a pure function of the question list, the recorded answers and
//! per-question time. It never mutates session state and yields identical
//! results when re-run on the same snapshot.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::MockTestError;
use crate::model::{Answer, CorrectAnswer, Question, Subject};
use crate::results::{
    OverallSummary, Outcome, QuestionResult, ScoringAnomaly, SubjectResult, TestResults,
};
use crate::session::SessionSnapshot;

/// Partial credit for a multi-correct selection that is a proper, non-empty
/// subset of the correct options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum PartialCredit {
    /// Fixed points per correctly chosen option (JEE Advanced: 1 each).
    PerOption { points: f64 },
    /// `marks * chosen / |correct|`.
    Proportional,
    /// Subsets score nothing.
    Disabled,
}

impl Default for PartialCredit {
    fn default() -> Self {
        PartialCredit::PerOption { points: 1.0 }
    }
}

/// Tunable marking rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Absolute tolerance for numerical answers, exclusive.
    #[serde(default = "default_tolerance")]
    pub numerical_tolerance: f64,
    #[serde(default)]
    pub partial_credit: PartialCredit,
}

fn default_tolerance() -> f64 {
    0.01
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            numerical_tolerance: default_tolerance(),
            partial_credit: PartialCredit::default(),
        }
    }
}

/// Result of marking one question.
#[derive(Debug, Clone, PartialEq)]
pub struct Marking {
    pub outcome: Outcome,
    pub marks: f64,
    /// Set when the stored answer could not be scored.
    pub anomaly: Option<String>,
}

impl Marking {
    fn new(outcome: Outcome, marks: f64) -> Self {
        Self {
            outcome,
            marks,
            anomaly: None,
        }
    }

    fn unanswered() -> Self {
        Self::new(Outcome::Unanswered, 0.0)
    }

    fn malformed(reason: String) -> Self {
        Self {
            outcome: Outcome::Unanswered,
            marks: 0.0,
            anomaly: Some(reason),
        }
    }

    pub fn attempted(&self) -> bool {
        self.outcome != Outcome::Unanswered
    }
}

/// The scoring engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer {
    policy: ScoringPolicy,
}

impl Scorer {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Score a frozen session snapshot.
    pub fn score_snapshot(&self, snapshot: &SessionSnapshot) -> TestResults {
        self.score(
            &snapshot.questions,
            &snapshot.answers,
            &snapshot.time_spent_per_question_ms,
        )
    }

    /// Score `questions` against `answers` (keyed by question id).
    pub fn score(
        &self,
        questions: &[Question],
        answers: &BTreeMap<u32, Answer>,
        time_spent_ms: &BTreeMap<u32, u64>,
    ) -> TestResults {
        let mut question_wise = Vec::with_capacity(questions.len());
        let mut anomalies = Vec::new();
        let mut subjects: BTreeMap<Subject, SubjectResult> = BTreeMap::new();
        let mut total_ms: u64 = 0;

        for question in questions {
            let answer = answers.get(&question.id);
            let marking = self.mark(question, answer);

            if let Some(reason) = &marking.anomaly {
                let err = MockTestError::MalformedAnswer {
                    question_id: question.id,
                    reason: reason.clone(),
                };
                tracing::warn!("{err}; treating Q{} as unattempted", question.number);
                anomalies.push(ScoringAnomaly {
                    question_id: question.id,
                    question_number: question.number,
                    reason: reason.clone(),
                });
            }

            let spent_ms = time_spent_ms.get(&question.id).copied().unwrap_or(0);
            total_ms = total_ms.saturating_add(spent_ms);

            let stats = subjects
                .entry(question.subject)
                .or_insert_with(|| empty_subject(question.subject));
            stats.total_questions += 1;
            stats.max_possible_marks += question.marks;
            stats.total_marks += marking.marks;
            match marking.outcome {
                Outcome::Correct => stats.correct += 1,
                Outcome::Partial => stats.partial_correct += 1,
                Outcome::Incorrect => stats.incorrect += 1,
                Outcome::Unanswered => stats.unanswered += 1,
            }
            if marking.attempted() {
                stats.attempted += 1;
            }

            question_wise.push(QuestionResult {
                question_id: question.id,
                question_number: question.number,
                subject: question.subject,
                kind: question.kind,
                attempted: marking.attempted(),
                outcome: marking.outcome,
                marks_awarded: marking.marks,
                max_marks: question.marks,
                time_spent_secs: spent_ms / 1000,
                user_answer: answer.filter(|a| !a.is_blank()).cloned(),
                correct_answer: question.correct_answer.clone(),
            });
        }

        let subject_wise: Vec<SubjectResult> = subjects.into_values().collect();
        let overall = summarize(&subject_wise, total_ms);

        TestResults {
            overall,
            subject_wise,
            question_wise,
            anomalies,
        }
    }

    /// Mark a single question. `None` means no response was recorded.
    pub fn mark(&self, question: &Question, answer: Option<&Answer>) -> Marking {
        let Some(answer) = answer.filter(|a| !a.is_blank()) else {
            return Marking::unanswered();
        };

        match (&question.correct_answer, answer) {
            (CorrectAnswer::Single(key), Answer::Single(chosen)) => {
                if chosen.trim().eq_ignore_ascii_case(key.trim()) {
                    Marking::new(Outcome::Correct, question.marks)
                } else {
                    Marking::new(Outcome::Incorrect, question.negative_mark)
                }
            }
            (CorrectAnswer::Numerical(expected), Answer::Numerical(value)) => {
                if !value.is_finite() {
                    return Marking::malformed(format!("non-finite numerical answer {value}"));
                }
                if (value - expected).abs() < self.policy.numerical_tolerance {
                    Marking::new(Outcome::Correct, question.marks)
                } else {
                    // No negative marking for numerical answers.
                    Marking::new(Outcome::Incorrect, 0.0)
                }
            }
            (CorrectAnswer::Multi(correct), Answer::Multi(chosen)) => {
                self.mark_multi(question, correct, chosen)
            }
            (correct, answer) => Marking::malformed(format!(
                "expected a {} answer, got {}",
                correct.kind(),
                answer.shape_name()
            )),
        }
    }

    fn mark_multi(
        &self,
        question: &Question,
        correct: &BTreeSet<String>,
        chosen: &BTreeSet<String>,
    ) -> Marking {
        let chosen: BTreeSet<String> = chosen.iter().map(|k| k.trim().to_uppercase()).collect();

        // Any wrong option dominates partial credit.
        if chosen.iter().any(|k| !correct.contains(k)) {
            return Marking::new(Outcome::Incorrect, question.negative_mark);
        }
        if chosen == *correct {
            return Marking::new(Outcome::Correct, question.marks);
        }
        if chosen.is_empty() {
            return Marking::unanswered();
        }

        let hits = chosen.len() as f64;
        let marks = match self.policy.partial_credit {
            PartialCredit::PerOption { points } => points * hits,
            PartialCredit::Proportional => question.marks * hits / correct.len() as f64,
            PartialCredit::Disabled => 0.0,
        };
        Marking::new(Outcome::Partial, marks)
    }
}

/// Score with the default policy.
pub fn score(
    questions: &[Question],
    answers: &BTreeMap<u32, Answer>,
    time_spent_ms: &BTreeMap<u32, u64>,
) -> TestResults {
    Scorer::default().score(questions, answers, time_spent_ms)
}

fn empty_subject(subject: Subject) -> SubjectResult {
    SubjectResult {
        subject,
        total_questions: 0,
        attempted: 0,
        correct: 0,
        incorrect: 0,
        partial_correct: 0,
        unanswered: 0,
        total_marks: 0.0,
        max_possible_marks: 0.0,
    }
}

fn summarize(subjects: &[SubjectResult], total_ms: u64) -> OverallSummary {
    let mut overall = OverallSummary {
        total_questions: 0,
        attempted: 0,
        correct: 0,
        incorrect: 0,
        partial_correct: 0,
        unanswered: 0,
        total_marks: 0.0,
        max_possible_marks: 0.0,
        percentage: 0.0,
        total_time_spent_minutes: total_ms / 60_000,
    };

    for s in subjects {
        overall.total_questions += s.total_questions;
        overall.attempted += s.attempted;
        overall.correct += s.correct;
        overall.incorrect += s.incorrect;
        overall.partial_correct += s.partial_correct;
        overall.unanswered += s.unanswered;
        overall.total_marks += s.total_marks;
        overall.max_possible_marks += s.max_possible_marks;
    }

    if overall.max_possible_marks > 0.0 {
        overall.percentage =
            (100.0 * overall.total_marks / overall.max_possible_marks).max(0.0);
    }
    overall
}
