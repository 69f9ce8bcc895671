//! The `mocktest validate` command.

use std::path::PathBuf;

use anyhow::Result;

use mocktest_core::answer_key::AnswerKey;
use mocktest_core::builder::{
    build_question_set, validate_question_set, MissingKeyPolicy, TestConfig,
};
use mocktest_core::model::{QuestionKind, Subject};

pub fn execute(test_config: PathBuf, answer_key: Option<PathBuf>) -> Result<()> {
    let config = TestConfig::load(&test_config)?;

    let key = match answer_key {
        Some(path) => {
            let parsed = AnswerKey::load_csv(&path)?;
            println!("Answer key: {} entries", parsed.key.len());
            for row in &parsed.skipped {
                println!("  [line {}] SKIPPED: {}", row.line, row.reason);
            }
            Some(parsed.key)
        }
        None => None,
    };

    let set = build_question_set(&config, key.as_ref(), MissingKeyPolicy::Placeholder)?;
    println!(
        "Test: {} ({} questions, {} min)",
        config.name,
        set.questions.len(),
        config.duration_minutes
    );

    for subject in Subject::ALL {
        let counts: Vec<String> = QuestionKind::ALL
            .iter()
            .map(|kind| {
                let n = set
                    .questions
                    .iter()
                    .filter(|q| q.subject == subject && q.kind == *kind)
                    .count();
                format!("{n} {kind}")
            })
            .collect();
        println!("  {subject}: {}", counts.join(", "));
    }

    let report = &set.report;
    if !report.placeholder_numbers.is_empty() {
        println!(
            "  WARNING: {} question(s) without an answer-key entry: {}",
            report.placeholder_numbers.len(),
            join_numbers(&report.placeholder_numbers)
        );
    }
    if !report.mismatched_numbers.is_empty() {
        println!(
            "  WARNING: {} answer-key entries do not fit the question type: {}",
            report.mismatched_numbers.len(),
            join_numbers(&report.mismatched_numbers)
        );
    }

    let warnings = validate_question_set(&set.questions);
    for w in &warnings {
        let prefix = w
            .number
            .map(|n| format!("  [Q{n}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    let total = warnings.len() + report.affected_count();
    if total == 0 {
        println!("Configuration valid.");
    } else {
        println!("\n{total} warning(s) found.");
    }

    Ok(())
}

fn join_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
