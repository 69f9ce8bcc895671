//! Navigation and selection controller.
//!
//! `ExamController` is the state machine the UI drives:
//!
//! ```text
//! NotStarted --start--> InProgress --submit / expiry--> Completed
//!      ^                                                    |
//!      +------------------------- reset --------------------+
//! ```
//!
//! Every mutation first flushes clock time into the question being left, so
//! per-question time never lands on the wrong question.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MockTestError, Result};
use crate::model::{Answer, Question, Subject};
use crate::results::{Submission, TestResults};
use crate::scoring::Scorer;
use crate::session::{PaletteStatus, PaletteSummary, SessionStore};
use crate::timer::{Clock, Stopwatch, SystemClock};

/// Lifecycle phase of the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    NotStarted,
    InProgress,
    Completed,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::NotStarted => "not started",
            Phase::InProgress => "in progress",
            Phase::Completed => "completed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The session is not in progress; nothing changed.
    Idle,
    Running { remaining_ms: u64 },
    /// Time ran out on this tick and the attempt was auto-submitted.
    Expired(Submission),
}

/// Drives one attempt.
pub struct ExamController {
    session: SessionStore,
    scorer: Scorer,
    clock: Arc<dyn Clock>,
    stopwatch: Stopwatch,
    submission: Option<Submission>,
}

impl fmt::Debug for ExamController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamController")
            .field("phase", &self.phase())
            .field("session", &self.session)
            .field("scorer", &self.scorer)
            .finish()
    }
}

impl ExamController {
    pub fn new(session: SessionStore, scorer: Scorer) -> Self {
        Self {
            session,
            scorer,
            clock: Arc::new(SystemClock::new()),
            stopwatch: Stopwatch::default(),
            submission: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn phase(&self) -> Phase {
        let state = self.session.state();
        if !state.started {
            Phase::NotStarted
        } else if state.completed {
            Phase::Completed
        } else {
            Phase::InProgress
        }
    }

    /// `NotStarted -> InProgress`.
    pub fn start(&mut self, questions: Vec<Question>, duration_ms: u64) -> Result<()> {
        self.session.initialize(questions, duration_ms)?;
        self.submission = None;
        self.stopwatch.start(self.clock.now());
        Ok(())
    }

    /// Restore a persisted attempt. A completed one comes back with its
    /// results recomputed.
    pub fn resume(&mut self) -> bool {
        if !self.session.resume() {
            return false;
        }
        match self.phase() {
            Phase::InProgress => self.stopwatch.start(self.clock.now()),
            Phase::Completed => {
                self.stopwatch.stop();
                self.submission = Some(self.build_submission());
            }
            Phase::NotStarted => {}
        }
        true
    }

    /// Back to `NotStarted`, clearing the persisted attempt.
    pub fn reset(&mut self) {
        self.stopwatch.stop();
        self.submission = None;
        self.session.reset();
    }

    /// Advance by however much the clock moved since the last poll.
    pub fn poll(&mut self) -> TickOutcome {
        let delta = self.stopwatch.lap(self.clock.now());
        self.tick(delta)
    }

    /// Advance by `delta_ms`. Expiry auto-submits exactly once; later ticks
    /// are [`TickOutcome::Idle`].
    pub fn tick(&mut self, delta_ms: u64) -> TickOutcome {
        if self.phase() != Phase::InProgress {
            return TickOutcome::Idle;
        }
        let remaining_ms = self.session.tick(delta_ms);
        if remaining_ms == 0 {
            tracing::info!("time expired, auto-submitting");
            return TickOutcome::Expired(self.finish(true));
        }
        TickOutcome::Running { remaining_ms }
    }

    /// Charge wall-clock time that passed while nothing drove the session,
    /// measured from the last save, then save again.
    pub fn catch_up(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let away_ms = self
            .session
            .state()
            .saved_at
            .map(|saved_at| (now - saved_at).num_milliseconds().max(0) as u64)
            .unwrap_or(0);
        let outcome = self.tick(away_ms);
        if let TickOutcome::Running { .. } = outcome {
            self.session.persist();
        }
        outcome
    }

    /// Best-effort save of the current state.
    pub fn save(&mut self) {
        self.session.persist();
    }

    fn ensure_in_progress(&self) -> Result<()> {
        match self.phase() {
            Phase::InProgress => Ok(()),
            phase => Err(MockTestError::NotInProgress {
                phase: phase.as_str(),
            }),
        }
    }

    /// Check the phase and flush elapsed time into the current question.
    fn begin_mutation(&mut self) -> Result<()> {
        self.ensure_in_progress()?;
        if let TickOutcome::Expired(_) = self.poll() {
            return Err(MockTestError::NotInProgress {
                phase: Phase::Completed.as_str(),
            });
        }
        Ok(())
    }

    pub fn current_index(&self) -> usize {
        self.session.state().current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session.state().current_question()
    }

    fn current_id(&self) -> Result<u32> {
        let state = self.session.state();
        state
            .current_question()
            .map(|q| q.id)
            .ok_or(MockTestError::IndexOutOfRange {
                index: state.current_index,
                len: state.questions.len(),
            })
    }

    fn move_to(&mut self, index: usize) -> Result<usize> {
        if index != self.current_index() {
            self.session.set_current(index)?;
            tracing::debug!(index, "navigated");
        }
        Ok(index)
    }

    /// Next question, clamped at the last one.
    pub fn next(&mut self) -> Result<usize> {
        self.begin_mutation()?;
        let last = self.session.state().questions.len().saturating_sub(1);
        self.move_to((self.current_index() + 1).min(last))
    }

    /// Previous question, clamped at the first one.
    pub fn previous(&mut self) -> Result<usize> {
        self.begin_mutation()?;
        self.move_to(self.current_index().saturating_sub(1))
    }

    pub fn jump_to_index(&mut self, index: usize) -> Result<()> {
        self.begin_mutation()?;
        self.move_to(index).map(|_| ())
    }

    /// First question of `subject`, or `None` (and no move) if it has none.
    pub fn jump_to_subject(&mut self, subject: Subject) -> Result<Option<usize>> {
        self.begin_mutation()?;
        match self.session.state().first_index_of(subject) {
            Some(index) => self.move_to(index).map(Some),
            None => Ok(None),
        }
    }

    /// Palette click by display number.
    pub fn jump_to_number(&mut self, number: u32) -> Result<usize> {
        self.begin_mutation()?;
        let index = self
            .session
            .state()
            .index_of_number(number)
            .ok_or(MockTestError::UnknownQuestion(number))?;
        self.move_to(index)
    }

    /// Parse `raw` for the current question and record it.
    pub fn answer(&mut self, raw: &str) -> Result<()> {
        self.begin_mutation()?;
        let id = self.current_id()?;
        let answer = match self.session.state().question(id) {
            Some(q) => q.parse_answer(raw)?,
            None => return Err(MockTestError::UnknownQuestion(id)),
        };
        self.session.set_answer(id, answer)
    }

    /// Record a typed answer for any question.
    pub fn answer_question(&mut self, question_id: u32, answer: Answer) -> Result<()> {
        self.begin_mutation()?;
        self.session.set_answer(question_id, answer)
    }

    /// Remove the current response and its review mark.
    pub fn clear_response(&mut self) -> Result<()> {
        self.begin_mutation()?;
        let id = self.current_id()?;
        self.session.clear_answer(id)
    }

    pub fn toggle_review(&mut self) -> Result<bool> {
        self.begin_mutation()?;
        let id = self.current_id()?;
        self.session.toggle_review(id)
    }

    pub fn mark_for_review(&mut self) -> Result<()> {
        self.begin_mutation()?;
        let id = self.current_id()?;
        self.session.mark_for_review(id)
    }

    /// Manual submit: `InProgress -> Completed`.
    pub fn submit(&mut self) -> Result<Submission> {
        self.begin_mutation()?;
        Ok(self.finish(false))
    }

    /// Results of the completed attempt.
    pub fn results(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    /// Score the current state without completing the attempt.
    pub fn preview(&self) -> TestResults {
        self.scorer.score_snapshot(&self.session.snapshot())
    }

    pub fn question_status(&self, question_id: u32) -> Option<PaletteStatus> {
        let state = self.session.state();
        state.question(question_id).map(|q| state.status(q.id))
    }

    pub fn palette_summary(&self) -> PaletteSummary {
        self.session.state().palette_summary()
    }

    fn finish(&mut self, auto_submitted: bool) -> Submission {
        self.stopwatch.stop();
        self.session.complete(auto_submitted);
        let submission = self.build_submission();
        tracing::info!(
            attempt = %submission.attempt_id,
            auto_submitted,
            marks = submission.results.overall.total_marks,
            max = submission.results.overall.max_possible_marks,
            "attempt submitted"
        );
        self.submission = Some(submission.clone());
        submission
    }

    fn build_submission(&self) -> Submission {
        let state = self.session.state();
        Submission {
            attempt_id: state.attempt_id,
            results: self.scorer.score_snapshot(&self.session.snapshot()),
            auto_submitted: state.auto_submitted,
            completed_at: state.completed_at.unwrap_or_else(Utc::now),
        }
    }
}
