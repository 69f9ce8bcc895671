//! The `mocktest submit` command.

use std::path::PathBuf;

use anyhow::Result;

use mocktest_core::controller::Phase;
use mocktest_core::results::{fmt_marks, Submission};

use super::open_session;

pub fn execute(output: Option<PathBuf>, format: String, config: Option<PathBuf>) -> Result<()> {
    let (engine, mut controller) = open_session(config.as_deref())?;

    let submission = match controller.phase() {
        Phase::NotStarted => anyhow::bail!("no test in progress; run `mocktest start` first"),
        Phase::InProgress => controller.submit()?,
        Phase::Completed => match controller.results() {
            Some(submission) => submission.clone(),
            None => anyhow::bail!("completed attempt has no results"),
        },
    };

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", submission.results.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&submission)?);
        }
        _ => print_summary(&submission),
    }

    let path = output.unwrap_or_else(|| {
        engine
            .storage_dir
            .join(format!("results-{}.json", submission.attempt_id))
    });
    submission.results.save_json(&path)?;
    eprintln!("Results saved to: {}", path.display());

    Ok(())
}

fn print_summary(submission: &Submission) {
    use comfy_table::{Cell, Table};

    let overall = &submission.results.overall;
    if submission.auto_submitted {
        println!("Submitted automatically when time ran out.");
    }
    println!(
        "Score: {} / {} ({:.1}%)",
        fmt_marks(overall.total_marks),
        fmt_marks(overall.max_possible_marks),
        overall.percentage
    );
    println!(
        "Attempted {} of {}, time spent {} min",
        overall.attempted, overall.total_questions, overall.total_time_spent_minutes
    );

    let mut table = Table::new();
    table.set_header(vec![
        "Subject",
        "Marks",
        "Attempted",
        "Correct",
        "Partial",
        "Incorrect",
        "Unanswered",
    ]);

    for s in &submission.results.subject_wise {
        table.add_row(vec![
            Cell::new(s.subject),
            Cell::new(format!(
                "{} / {}",
                fmt_marks(s.total_marks),
                fmt_marks(s.max_possible_marks)
            )),
            Cell::new(s.attempted),
            Cell::new(s.correct),
            Cell::new(s.partial_correct),
            Cell::new(s.incorrect),
            Cell::new(s.unanswered),
        ]);
    }

    println!("\n{table}");

    for anomaly in &submission.results.anomalies {
        println!("Unscored Q{}: {}", anomaly.question_number, anomaly.reason);
    }
}
