//! Session state for one attempt, and its persistence boundary.
//!
//! [`SessionStore`] owns the only mutable copy of a [`SessionState`]. It saves
//! through an injected [`PersistenceStore`] on every answer or review change
//! and periodically as tick time accumulates. Failed saves are logged and
//! never interrupt the mutation that triggered them.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MockTestError, Result};
use crate::model::{Answer, Question, Subject};
use crate::persistence::PersistenceStore;

/// Storage key used when none is configured.
pub const DEFAULT_SESSION_KEY: &str = "mockTestState";

/// Default interval between periodic saves.
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(10);

/// The mutable aggregate for one attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub current_subject: Subject,
    /// Question id to response. Absence means unattempted.
    pub answers: BTreeMap<u32, Answer>,
    pub marked_for_review: BTreeSet<u32>,
    pub visited: BTreeSet<u32>,
    pub time_remaining_ms: u64,
    pub duration_ms: u64,
    pub time_spent_per_question_ms: BTreeMap<u32, u64>,
    pub started: bool,
    pub completed: bool,
    pub auto_submitted: bool,
    pub attempt_id: Uuid,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Wall-clock time of the last successful save.
    pub saved_at: Option<DateTime<Utc>>,
}

impl SessionState {
    /// Started and not yet completed.
    pub fn is_live(&self) -> bool {
        self.started && !self.completed
    }

    /// Whether a persisted state is worth resuming.
    pub fn is_resumable(&self) -> bool {
        self.started && !self.questions.is_empty()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn question(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Index of the question shown as `number`.
    pub fn index_of_number(&self, number: u32) -> Option<usize> {
        self.questions.iter().position(|q| q.number == number)
    }

    /// Index of the first question of `subject`.
    pub fn first_index_of(&self, subject: Subject) -> Option<usize> {
        self.questions.iter().position(|q| q.subject == subject)
    }

    pub fn is_answered(&self, id: u32) -> bool {
        self.answers.get(&id).is_some_and(|a| !a.is_blank())
    }

    /// Palette status of question `id`.
    pub fn status(&self, id: u32) -> PaletteStatus {
        let answered = self.is_answered(id);
        let marked = self.marked_for_review.contains(&id);
        match (answered, marked) {
            (true, true) => PaletteStatus::MarkedAnswered,
            (false, true) => PaletteStatus::Marked,
            (true, false) => PaletteStatus::Answered,
            (false, false) if self.visited.contains(&id) => PaletteStatus::NotAnswered,
            (false, false) => PaletteStatus::NotVisited,
        }
    }

    pub fn palette_summary(&self) -> PaletteSummary {
        let mut summary = PaletteSummary::default();
        for q in &self.questions {
            match self.status(q.id) {
                PaletteStatus::NotVisited => summary.not_visited += 1,
                PaletteStatus::NotAnswered => summary.not_answered += 1,
                PaletteStatus::Answered => summary.answered += 1,
                PaletteStatus::Marked => summary.marked += 1,
                PaletteStatus::MarkedAnswered => summary.marked_answered += 1,
            }
        }
        summary
    }
}

/// Colour bucket of a question in the navigation palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaletteStatus {
    NotVisited,
    NotAnswered,
    Answered,
    Marked,
    MarkedAnswered,
}

/// Counts per palette bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteSummary {
    pub answered: usize,
    pub not_answered: usize,
    pub marked: usize,
    pub marked_answered: usize,
    pub not_visited: usize,
}

impl PaletteSummary {
    /// Questions carrying a review mark, answered or not.
    pub fn review_total(&self) -> usize {
        self.marked + self.marked_answered
    }
}

/// Immutable copy of the state the scoring engine reads.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub attempt_id: Uuid,
    pub questions: Vec<Question>,
    pub answers: BTreeMap<u32, Answer>,
    pub marked_for_review: BTreeSet<u32>,
    pub time_spent_per_question_ms: BTreeMap<u32, u64>,
    pub time_remaining_ms: u64,
    pub duration_ms: u64,
    pub auto_submitted: bool,
}

/// Owner of the live [`SessionState`].
pub struct SessionStore {
    state: SessionState,
    store: Box<dyn PersistenceStore>,
    key: String,
    autosave_interval_ms: u64,
    since_save_ms: u64,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("key", &self.key)
            .field("started", &self.state.started)
            .field("completed", &self.state.completed)
            .field("questions", &self.state.questions.len())
            .finish()
    }
}

impl SessionStore {
    pub fn new(store: Box<dyn PersistenceStore>) -> Self {
        Self {
            state: SessionState::default(),
            store,
            key: DEFAULT_SESSION_KEY.to_string(),
            autosave_interval_ms: DEFAULT_AUTOSAVE_INTERVAL.as_millis() as u64,
            since_save_ms: 0,
        }
    }

    /// Use `key` in the persistence store.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Start a fresh attempt over `questions`.
    pub fn initialize(&mut self, questions: Vec<Question>, duration_ms: u64) -> Result<()> {
        if self.state.started {
            return Err(MockTestError::AlreadyStarted);
        }
        let Some(first) = questions.first() else {
            return Err(MockTestError::EmptyConfiguration);
        };

        let first_id = first.id;
        let first_subject = first.subject;
        self.state = SessionState {
            questions,
            current_index: 0,
            current_subject: first_subject,
            visited: BTreeSet::from([first_id]),
            time_remaining_ms: duration_ms,
            duration_ms,
            started: true,
            attempt_id: Uuid::new_v4(),
            started_at: Some(Utc::now()),
            ..Default::default()
        };
        self.since_save_ms = 0;

        tracing::info!(
            attempt = %self.state.attempt_id,
            questions = self.state.questions.len(),
            duration_ms,
            "session initialized"
        );
        self.persist();
        Ok(())
    }

    /// Drop the attempt and its persisted copy.
    pub fn reset(&mut self) {
        self.state = SessionState::default();
        self.since_save_ms = 0;
        if let Err(e) = self.store.clear(&self.key) {
            let err = MockTestError::PersistenceFailure(format!("{e:#}"));
            tracing::warn!("{err}");
        }
        tracing::debug!("session reset");
    }

    /// Restore a persisted attempt. Returns `false` when there is nothing
    /// resumable, leaving the store empty for a fresh start.
    pub fn resume(&mut self) -> bool {
        let raw = match self.store.load(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(e) => {
                let err = MockTestError::PersistenceFailure(format!("{e:#}"));
                tracing::warn!("{err}");
                return false;
            }
        };

        let mut state: SessionState = match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("discarding unreadable session state: {e}");
                return false;
            }
        };
        if !state.is_resumable() {
            tracing::debug!("persisted session is not resumable");
            return false;
        }

        if state.current_index >= state.questions.len() {
            state.current_index = state.questions.len() - 1;
        }
        if let Some(subject) = state.current_question().map(|q| q.subject) {
            state.current_subject = subject;
        }

        tracing::info!(
            attempt = %state.attempt_id,
            remaining_ms = state.time_remaining_ms,
            completed = state.completed,
            "session resumed"
        );
        self.state = state;
        self.since_save_ms = 0;
        true
    }

    fn question_kind(&self, question_id: u32) -> Result<crate::model::QuestionKind> {
        self.state
            .question(question_id)
            .map(|q| q.kind)
            .ok_or(MockTestError::UnknownQuestion(question_id))
    }

    /// Record `answer` for a question. A blank answer removes the response.
    pub fn set_answer(&mut self, question_id: u32, answer: Answer) -> Result<()> {
        let kind = self.question_kind(question_id)?;
        if !answer.fits(kind) {
            return Err(MockTestError::InvalidAnswerShape {
                question_id,
                expected: kind,
                found: answer.shape_name(),
            });
        }
        if let Answer::Numerical(value) = &answer {
            if !value.is_finite() {
                return Err(MockTestError::InvalidAnswerShape {
                    question_id,
                    expected: kind,
                    found: "non-finite number",
                });
            }
        }

        if answer.is_blank() {
            self.state.answers.remove(&question_id);
        } else {
            tracing::debug!(question_id, %answer, "answer recorded");
            self.state.answers.insert(question_id, answer);
        }
        self.persist();
        Ok(())
    }

    /// Remove the response and any review mark.
    pub fn clear_answer(&mut self, question_id: u32) -> Result<()> {
        self.question_kind(question_id)?;
        self.state.answers.remove(&question_id);
        self.state.marked_for_review.remove(&question_id);
        self.persist();
        Ok(())
    }

    /// Flip the review mark. Returns whether the question is now marked.
    pub fn toggle_review(&mut self, question_id: u32) -> Result<bool> {
        self.question_kind(question_id)?;
        let marked = if self.state.marked_for_review.remove(&question_id) {
            false
        } else {
            self.state.marked_for_review.insert(question_id);
            true
        };
        self.persist();
        Ok(marked)
    }

    /// Add the review mark; a no-op if already marked.
    pub fn mark_for_review(&mut self, question_id: u32) -> Result<()> {
        self.question_kind(question_id)?;
        self.state.marked_for_review.insert(question_id);
        self.persist();
        Ok(())
    }

    /// Move the cursor to `index` and record the visit.
    pub fn set_current(&mut self, index: usize) -> Result<()> {
        let len = self.state.questions.len();
        let Some(question) = self.state.questions.get(index) else {
            return Err(MockTestError::IndexOutOfRange { index, len });
        };
        let (id, subject) = (question.id, question.subject);
        self.state.current_index = index;
        self.state.current_subject = subject;
        self.state.visited.insert(id);
        Ok(())
    }

    /// Advance time by `delta_ms`. Returns the remaining time.
    ///
    /// Only a live session ticks. The countdown floors at zero and the current
    /// question accrues at most the time that was actually left.
    pub fn tick(&mut self, delta_ms: u64) -> u64 {
        if !self.state.is_live() || delta_ms == 0 {
            return self.state.time_remaining_ms;
        }

        let elapsed = delta_ms.min(self.state.time_remaining_ms);
        self.state.time_remaining_ms -= elapsed;
        if let Some(id) = self.state.current_question().map(|q| q.id) {
            let spent = self.state.time_spent_per_question_ms.entry(id).or_insert(0);
            *spent = spent.saturating_add(elapsed);
        }

        self.since_save_ms = self.since_save_ms.saturating_add(elapsed);
        if self.since_save_ms >= self.autosave_interval_ms {
            self.persist();
        }
        self.state.time_remaining_ms
    }

    /// Freeze the attempt.
    pub fn complete(&mut self, auto_submitted: bool) {
        self.state.completed = true;
        self.state.auto_submitted = auto_submitted;
        self.state.completed_at = Some(Utc::now());
        self.persist();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            attempt_id: self.state.attempt_id,
            questions: self.state.questions.clone(),
            answers: self.state.answers.clone(),
            marked_for_review: self.state.marked_for_review.clone(),
            time_spent_per_question_ms: self.state.time_spent_per_question_ms.clone(),
            time_remaining_ms: self.state.time_remaining_ms,
            duration_ms: self.state.duration_ms,
            auto_submitted: self.state.auto_submitted,
        }
    }

    /// Best-effort save; failures are logged.
    pub fn persist(&mut self) {
        if let Err(e) = self.try_persist() {
            tracing::warn!("{e}; continuing without saving");
        }
    }

    /// Save now, reporting any failure.
    pub fn try_persist(&mut self) -> Result<()> {
        self.since_save_ms = 0;
        let previous = self.state.saved_at.replace(Utc::now());
        let saved = serde_json::to_string(&self.state)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.store.save(&self.key, &json));
        match saved {
            Ok(()) => Ok(()),
            Err(e) => {
                self.state.saved_at = previous;
                Err(MockTestError::PersistenceFailure(format!("{e:#}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::model::{CorrectAnswer, QuestionKind};
    use crate::persistence::MemoryStore;

    fn question(id: u32, subject: Subject, kind: QuestionKind) -> Question {
        Question {
            id,
            number: id,
            subject,
            kind,
            text: format!("Question {id}"),
            options: None,
            correct_answer: CorrectAnswer::placeholder(kind),
            marks: 4.0,
            negative_mark: -1.0,
        }
    }

    fn paper() -> Vec<Question> {
        vec![
            question(1, Subject::Physics, QuestionKind::SingleCorrect),
            question(2, Subject::Physics, QuestionKind::MultiCorrect),
            question(3, Subject::Chemistry, QuestionKind::Numerical),
        ]
    }

    /// Shares one `MemoryStore` between a session and the test.
    #[derive(Clone, Default)]
    struct SharedStore(Arc<MemoryStore>);

    impl PersistenceStore for SharedStore {
        fn save(&self, key: &str, value: &str) -> anyhow::Result<()> {
            self.0.save(key, value)
        }
        fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
            self.0.load(key)
        }
        fn clear(&self, key: &str) -> anyhow::Result<()> {
            self.0.clear(key)
        }
    }

    /// Counts saves; optionally fails them.
    #[derive(Clone, Default)]
    struct CountingStore {
        saves: Arc<AtomicUsize>,
        fail: bool,
    }

    impl PersistenceStore for CountingStore {
        fn save(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("disk full");
            }
            Ok(())
        }
        fn load(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
        fn clear(&self, _key: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn started() -> SessionStore {
        let mut store = SessionStore::new(Box::new(MemoryStore::new()));
        store.initialize(paper(), 60_000).unwrap();
        store
    }

    #[test]
    fn initialize_seeds_state() {
        let store = started();
        let state = store.state();
        assert!(state.started);
        assert!(!state.completed);
        assert_eq!(state.time_remaining_ms, 60_000);
        assert_eq!(state.current_index, 0);
        assert_eq!(state.current_subject, Subject::Physics);
        assert!(state.visited.contains(&1));
        assert!(!state.attempt_id.is_nil());
        assert!(state.started_at.is_some());
    }

    #[test]
    fn initialize_twice_requires_reset() {
        let mut store = started();
        store.set_answer(1, Answer::Single("B".into())).unwrap();

        let err = store.initialize(paper(), 1_000).unwrap_err();
        assert!(matches!(err, MockTestError::AlreadyStarted));
        assert_eq!(store.state().answers.len(), 1, "state untouched");

        store.reset();
        store.initialize(paper(), 1_000).unwrap();
        assert!(store.state().answers.is_empty());
    }

    #[test]
    fn initialize_rejects_empty_question_list() {
        let mut store = SessionStore::new(Box::new(MemoryStore::new()));
        assert!(matches!(
            store.initialize(Vec::new(), 1_000),
            Err(MockTestError::EmptyConfiguration)
        ));
        assert!(!store.state().started);
    }

    #[test]
    fn set_answer_checks_shape_without_corrupting_state() {
        let mut store = started();
        store.set_answer(1, Answer::Single("C".into())).unwrap();

        let err = store.set_answer(1, Answer::Numerical(3.0)).unwrap_err();
        assert!(matches!(
            err,
            MockTestError::InvalidAnswerShape {
                question_id: 1,
                expected: QuestionKind::SingleCorrect,
                found: "number"
            }
        ));
        assert_eq!(store.state().answers[&1], Answer::Single("C".into()));

        assert!(matches!(
            store.set_answer(99, Answer::Numerical(1.0)),
            Err(MockTestError::UnknownQuestion(99))
        ));
    }

    #[test]
    fn non_finite_number_is_rejected_and_session_still_resumes() {
        let shared = SharedStore::default();
        let mut store = SessionStore::new(Box::new(shared.clone()));
        store.initialize(paper(), 60_000).unwrap();
        store.set_answer(3, Answer::Numerical(2.5)).unwrap();

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = store.set_answer(3, Answer::Numerical(bad)).unwrap_err();
            assert!(matches!(
                err,
                MockTestError::InvalidAnswerShape {
                    question_id: 3,
                    found: "non-finite number",
                    ..
                }
            ));
        }
        assert_eq!(store.state().answers[&3], Answer::Numerical(2.5));

        let mut reopened = SessionStore::new(Box::new(shared));
        assert!(reopened.resume());
        assert_eq!(reopened.state().answers[&3], Answer::Numerical(2.5));
    }

    #[test]
    fn blank_answer_removes_response() {
        let mut store = started();
        store.set_answer(2, Answer::multi(["A"])).unwrap();
        store.set_answer(2, Answer::multi(Vec::<String>::new())).unwrap();
        assert!(!store.state().answers.contains_key(&2));
        store.set_answer(1, Answer::Single("A".into())).unwrap();
        store.set_answer(1, Answer::Unanswered).unwrap();
        assert!(store.state().answers.is_empty());
    }

    #[test]
    fn clear_answer_drops_review_mark() {
        let mut store = started();
        store.set_answer(1, Answer::Single("A".into())).unwrap();
        store.mark_for_review(1).unwrap();
        store.clear_answer(1).unwrap();
        assert!(store.state().answers.is_empty());
        assert!(store.state().marked_for_review.is_empty());
    }

    #[test]
    fn toggle_review_without_answer() {
        let mut store = started();
        assert!(store.toggle_review(3).unwrap());
        assert!(store.state().marked_for_review.contains(&3));
        assert!(!store.toggle_review(3).unwrap());
        assert!(store.state().marked_for_review.is_empty());

        store.mark_for_review(2).unwrap();
        store.mark_for_review(2).unwrap();
        assert_eq!(store.state().marked_for_review.len(), 1);
    }

    #[test]
    fn tick_floors_at_zero_and_accrues_to_current() {
        let mut store = started();
        assert_eq!(store.tick(1_000), 59_000);
        store.set_current(2).unwrap();
        assert_eq!(store.tick(500), 58_500);
        assert_eq!(store.tick(100_000), 0);

        let spent = &store.state().time_spent_per_question_ms;
        assert_eq!(spent[&1], 1_000);
        assert_eq!(spent[&3], 59_000, "only the time actually left accrues");
        assert_eq!(store.state().current_subject, Subject::Chemistry);
    }

    #[test]
    fn tick_is_ignored_outside_live_session() {
        let mut idle = SessionStore::new(Box::new(MemoryStore::new()));
        assert_eq!(idle.tick(1_000), 0);
        assert!(idle.state().time_spent_per_question_ms.is_empty());

        let mut store = started();
        store.complete(false);
        assert_eq!(store.tick(1_000), 60_000);
        assert!(store.state().time_spent_per_question_ms.is_empty());
    }

    #[test]
    fn set_current_validates_bounds() {
        let mut store = started();
        assert!(matches!(
            store.set_current(3),
            Err(MockTestError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert_eq!(store.state().current_index, 0);
    }

    #[test]
    fn state_roundtrips_through_persistence() {
        let shared = SharedStore::default();
        let mut store = SessionStore::new(Box::new(shared.clone()));
        store.initialize(paper(), 60_000).unwrap();
        store.set_answer(1, Answer::Single("B".into())).unwrap();
        store.set_answer(2, Answer::multi(["D", "A"])).unwrap();
        store.set_answer(3, Answer::Numerical(25.5)).unwrap();
        store.toggle_review(3).unwrap();
        store.toggle_review(1).unwrap();
        store.set_current(1).unwrap();
        store.tick(2_500);
        store.persist();

        let mut restored = SessionStore::new(Box::new(shared));
        assert!(restored.resume());
        let (a, b) = (store.state(), restored.state());
        assert_eq!(b.answers, a.answers);
        assert_eq!(b.marked_for_review, BTreeSet::from([1, 3]));
        assert_eq!(b.time_spent_per_question_ms, a.time_spent_per_question_ms);
        assert_eq!(b.current_index, 1);
        assert_eq!(b.attempt_id, a.attempt_id);
        assert_eq!(b, a);
    }

    #[test]
    fn resume_skips_unstarted_or_corrupt_state() {
        let shared = SharedStore::default();
        let mut store = SessionStore::new(Box::new(shared.clone()));
        assert!(!store.resume(), "nothing persisted");

        let blank = serde_json::to_string(&SessionState::default()).unwrap();
        shared.save(DEFAULT_SESSION_KEY, &blank).unwrap();
        assert!(!store.resume());

        shared.save(DEFAULT_SESSION_KEY, "{not json").unwrap();
        assert!(!store.resume());
        assert!(!store.state().started);
    }

    #[test]
    fn reset_clears_persisted_copy() {
        let shared = SharedStore::default();
        let mut store = SessionStore::new(Box::new(shared.clone())).with_key("attempt");
        store.initialize(paper(), 1_000).unwrap();
        assert!(shared.load("attempt").unwrap().is_some());
        store.reset();
        assert!(shared.load("attempt").unwrap().is_none());
        assert!(!store.state().started);
    }

    #[test]
    fn mutations_and_interval_trigger_saves() {
        let counting = CountingStore::default();
        let mut store = SessionStore::new(Box::new(counting.clone()))
            .with_autosave_interval(Duration::from_secs(10));
        store.initialize(paper(), 600_000).unwrap();
        assert_eq!(counting.saves.load(Ordering::SeqCst), 1);

        store.set_answer(1, Answer::Single("A".into())).unwrap();
        store.toggle_review(1).unwrap();
        assert_eq!(counting.saves.load(Ordering::SeqCst), 3);

        for _ in 0..9 {
            store.tick(1_000);
        }
        assert_eq!(counting.saves.load(Ordering::SeqCst), 3);
        store.tick(1_000);
        assert_eq!(counting.saves.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn failed_save_does_not_interrupt_mutation() {
        let failing = CountingStore {
            fail: true,
            ..Default::default()
        };
        let mut store = SessionStore::new(Box::new(failing.clone()));
        store.initialize(paper(), 1_000).unwrap();
        store.set_answer(1, Answer::Single("A".into())).unwrap();
        assert_eq!(store.state().answers.len(), 1);
        assert!(store.state().saved_at.is_none());

        let err = store.try_persist().unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn palette_tracks_visits_answers_and_marks() {
        let mut store = started();
        store.set_answer(1, Answer::Single("A".into())).unwrap();
        store.set_current(1).unwrap();
        store.mark_for_review(3).unwrap();

        let state = store.state();
        assert_eq!(state.status(1), PaletteStatus::Answered);
        assert_eq!(state.status(2), PaletteStatus::NotAnswered);
        assert_eq!(state.status(3), PaletteStatus::Marked);

        store.mark_for_review(1).unwrap();
        assert_eq!(store.state().status(1), PaletteStatus::MarkedAnswered);

        let summary = store.state().palette_summary();
        assert_eq!(summary.marked_answered, 1);
        assert_eq!(summary.not_answered, 1);
        assert_eq!(summary.marked, 1);
        assert_eq!(summary.not_visited, 0);
        assert_eq!(summary.review_total(), 2);
    }

    #[test]
    fn snapshot_is_detached() {
        let mut store = started();
        store.set_answer(1, Answer::Single("A".into())).unwrap();
        let snapshot = store.snapshot();
        store.clear_answer(1).unwrap();
        assert_eq!(snapshot.answers.len(), 1);
        assert_eq!(snapshot.questions.len(), 3);
    }
}
