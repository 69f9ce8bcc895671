//! The `mocktest status` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use mocktest_core::controller::Phase;

use super::{format_remaining, open_session};

pub fn execute(config: Option<PathBuf>) -> Result<()> {
    let (_, controller) = open_session(config.as_deref())?;
    let state = controller.session().state();

    match controller.phase() {
        Phase::NotStarted => {
            println!("No test in progress.");
            return Ok(());
        }
        Phase::Completed => {
            println!("Test completed. Run `mocktest submit` to see results.");
            return Ok(());
        }
        Phase::InProgress => {}
    }

    println!(
        "Time remaining: {} of {}",
        format_remaining(state.time_remaining_ms),
        format_remaining(state.duration_ms)
    );
    if let Some(q) = controller.current_question() {
        println!("Current: Q{} ({}, {})", q.number, q.subject, q.kind);
    }

    let summary = controller.palette_summary();
    let mut table = Table::new();
    table.set_header(vec![
        "Answered",
        "Not answered",
        "Marked",
        "Marked + answered",
        "Not visited",
    ]);
    table.add_row(vec![
        Cell::new(summary.answered),
        Cell::new(summary.not_answered),
        Cell::new(summary.marked),
        Cell::new(summary.marked_answered),
        Cell::new(summary.not_visited),
    ]);
    println!("{table}");

    let review: Vec<String> = state
        .marked_for_review
        .iter()
        .filter_map(|id| state.question(*id))
        .map(|q| format!("Q{}", q.number))
        .collect();
    if !review.is_empty() {
        println!("Marked for review: {}", review.join(", "));
    }

    Ok(())
}
