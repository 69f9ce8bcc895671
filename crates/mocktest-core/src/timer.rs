//! Clocks and the background tick driver.
//!
//! The controller polls a [`Clock`] through a [`Stopwatch`]; nothing in the
//! core schedules itself. Hosts that want autonomous ticking use
//! [`spawn_ticker`], whose task stops as soon as the session leaves the
//! in-progress phase or the handle is cancelled or dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::controller::{ExamController, TickOutcome};

/// Monotonic time source measured from an arbitrary origin.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Wall clock backed by tokio's `Instant`, so paused test runtimes control it.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: tokio::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.millis
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

/// Measures whole milliseconds between polls while running.
///
/// Sub-millisecond remainders carry over to the next lap, so repeated polling
/// never loses time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stopwatch {
    mark: Option<Duration>,
}

impl Stopwatch {
    pub fn start(&mut self, now: Duration) {
        self.mark = Some(now);
    }

    pub fn stop(&mut self) {
        self.mark = None;
    }

    pub fn is_running(&self) -> bool {
        self.mark.is_some()
    }

    /// Milliseconds since the previous lap (or start). Zero when stopped.
    pub fn lap(&mut self, now: Duration) -> u64 {
        let Some(mark) = self.mark else {
            return 0;
        };
        let elapsed = now.saturating_sub(mark);
        let ms = elapsed.as_millis() as u64;
        self.mark = Some(mark + Duration::from_millis(ms));
        ms
    }
}

/// Handle to a running tick task.
#[derive(Debug)]
pub struct TickerHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl TickerHandle {
    /// Ask the task to stop before its next tick.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the task to exit.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            tracing::warn!("ticker task failed: {e}");
        }
    }

    /// Cancel and wait.
    pub async fn stop(self) {
        self.cancel();
        self.join().await;
    }
}

/// Poll `controller` every `period` until the session is no longer in
/// progress or the returned handle is cancelled.
///
/// Spawn it after the session has started; an idle controller ends the task
/// on its first tick.
pub fn spawn_ticker(controller: Arc<Mutex<ExamController>>, period: Duration) -> TickerHandle {
    let (tx, mut rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let outcome = controller.lock().await.poll();
                    match outcome {
                        TickOutcome::Running { .. } => {}
                        TickOutcome::Expired(submission) => {
                            tracing::debug!(attempt = %submission.attempt_id, "ticker stopping on expiry");
                            break;
                        }
                        TickOutcome::Idle => {
                            tracing::debug!("ticker stopping, session not in progress");
                            break;
                        }
                    }
                }
                changed = rx.changed() => {
                    if changed.is_err() || *rx.borrow() {
                        tracing::debug!("ticker cancelled");
                        break;
                    }
                }
            }
        }
    });

    TickerHandle { cancel: tx, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Phase;
    use crate::model::{CorrectAnswer, Question, QuestionKind, Subject};
    use crate::persistence::MemoryStore;
    use crate::scoring::Scorer;
    use crate::session::SessionStore;

    fn paper() -> Vec<Question> {
        (1..=3)
            .map(|id| Question {
                id,
                number: id,
                subject: Subject::Physics,
                kind: QuestionKind::Numerical,
                text: format!("Question {id}"),
                options: None,
                correct_answer: CorrectAnswer::Numerical(1.0),
                marks: 4.0,
                negative_mark: 0.0,
            })
            .collect()
    }

    fn shared_controller(duration_ms: u64) -> Arc<Mutex<ExamController>> {
        let session = SessionStore::new(Box::new(MemoryStore::new()));
        let mut controller = ExamController::new(session, Scorer::default());
        controller.start(paper(), duration_ms).unwrap();
        Arc::new(Mutex::new(controller))
    }

    #[test]
    fn stopwatch_laps_whole_millis() {
        let mut sw = Stopwatch::default();
        assert_eq!(sw.lap(Duration::from_secs(5)), 0);

        sw.start(Duration::ZERO);
        assert_eq!(sw.lap(Duration::from_micros(1_500)), 1);
        assert_eq!(sw.lap(Duration::from_micros(2_000)), 1, "remainder carried");
        sw.stop();
        assert!(!sw.is_running());
        assert_eq!(sw.lap(Duration::from_secs(10)), 0);
    }

    #[test]
    fn manual_clock_is_shared() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(Duration::from_millis(250));
        assert_eq!(other.now(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn system_clock_follows_paused_runtime() {
        let clock = SystemClock::new();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(clock.now(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_counts_down_and_auto_submits() {
        let controller = shared_controller(5_000);
        let handle = spawn_ticker(controller.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(controller.lock().await.session().state().time_remaining_ms, 3_000);

        tokio::time::timeout(Duration::from_secs(10), handle.join())
            .await
            .expect("ticker exits on expiry");

        let guard = controller.lock().await;
        assert_eq!(guard.phase(), Phase::Completed);
        let submission = guard.results().unwrap();
        assert!(submission.auto_submitted);
        assert_eq!(guard.session().state().time_remaining_ms, 0);
        assert_eq!(
            guard.session().state().time_spent_per_question_ms[&1],
            5_000
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_ticker_stops_mutating() {
        let controller = shared_controller(60_000);
        let handle = spawn_ticker(controller.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        handle.stop().await;
        let remaining = controller.lock().await.session().state().time_remaining_ms;
        assert_eq!(remaining, 58_000);

        tokio::time::sleep(Duration::from_secs(5)).await;
        let guard = controller.lock().await;
        assert_eq!(guard.session().state().time_remaining_ms, 58_000);
        assert_eq!(guard.phase(), Phase::InProgress);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_exits_after_manual_submit() {
        let controller = shared_controller(60_000);
        let handle = spawn_ticker(controller.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        let submission = controller.lock().await.submit().unwrap();
        assert!(!submission.auto_submitted);

        tokio::time::timeout(Duration::from_secs(5), handle.join())
            .await
            .expect("ticker exits once the session completes");
    }
}
