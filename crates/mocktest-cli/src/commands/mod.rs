pub mod answer;
pub mod init;
pub mod review;
pub mod start;
pub mod status;
pub mod submit;
pub mod validate;

use std::path::Path;

use anyhow::Result;
use chrono::Utc;

use mocktest_core::config::{load_config_from, EngineConfig};
use mocktest_core::controller::{ExamController, Phase, TickOutcome};

/// Load the engine config and resume the persisted attempt, charging the
/// time that passed since the previous command.
pub(crate) fn open_session(config: Option<&Path>) -> Result<(EngineConfig, ExamController)> {
    let config = load_config_from(config)?;
    let mut controller = config.controller();
    if controller.resume() {
        if let TickOutcome::Expired(_) = controller.catch_up(Utc::now()) {
            eprintln!("Time is up: the attempt was submitted automatically.");
        }
    }
    tracing::debug!(phase = %controller.phase(), "session opened");
    Ok((config, controller))
}

/// Like [`open_session`], but fails unless an attempt is in progress.
pub(crate) fn open_live_session(config: Option<&Path>) -> Result<(EngineConfig, ExamController)> {
    let (config, controller) = open_session(config)?;
    match controller.phase() {
        Phase::InProgress => Ok((config, controller)),
        Phase::NotStarted => anyhow::bail!("no test in progress; run `mocktest start` first"),
        Phase::Completed => {
            anyhow::bail!("the test has been submitted; run `mocktest submit` to see results")
        }
    }
}

/// `mm:ss`, or `h:mm:ss` past an hour.
pub(crate) fn format_remaining(ms: u64) -> String {
    let secs = ms / 1000;
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}
