//! The `mocktest start` command.

use std::path::PathBuf;

use anyhow::Result;

use mocktest_core::answer_key::AnswerKey;
use mocktest_core::builder::{build_question_set, TestConfig};
use mocktest_core::error::MockTestError;

use super::{format_remaining, open_session};

pub fn execute(
    test_config: PathBuf,
    answer_key: Option<PathBuf>,
    force: bool,
    config: Option<PathBuf>,
) -> Result<()> {
    let test = TestConfig::load(&test_config)?;
    let key = match answer_key {
        Some(path) => {
            let parsed = AnswerKey::load_csv(&path)?;
            if !parsed.skipped.is_empty() {
                eprintln!("Skipped {} answer-key row(s)", parsed.skipped.len());
            }
            Some(parsed.key)
        }
        None => None,
    };

    let (engine, mut controller) = open_session(config.as_deref())?;
    let set = build_question_set(&test, key.as_ref(), engine.missing_key_policy)?;

    if force {
        controller.reset();
    }
    match controller.start(set.questions, test.duration_ms()) {
        Err(MockTestError::AlreadyStarted) => {
            anyhow::bail!("{}; pass --force to discard it", MockTestError::AlreadyStarted)
        }
        other => other?,
    }

    let state = controller.session().state();
    println!(
        "Started {}: {} questions, {} remaining",
        test.name,
        state.questions.len(),
        format_remaining(state.time_remaining_ms)
    );
    println!("Attempt: {}", state.attempt_id);
    if set.report.affected_count() > 0 {
        println!(
            "Note: {} question(s) use a placeholder answer (missing or unusable key entry)",
            set.report.affected_count()
        );
    }

    Ok(())
}
