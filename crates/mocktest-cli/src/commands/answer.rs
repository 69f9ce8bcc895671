//! The `mocktest answer` command.

use std::path::PathBuf;

use anyhow::Result;

use super::open_live_session;

pub fn execute(
    question: u32,
    value: Option<String>,
    clear: bool,
    config: Option<PathBuf>,
) -> Result<()> {
    let (_, mut controller) = open_live_session(config.as_deref())?;
    controller.jump_to_number(question)?;

    if clear {
        controller.clear_response()?;
        println!("Q{question}: cleared");
        return Ok(());
    }

    let raw = value.unwrap_or_default();
    controller.answer(&raw)?;

    let state = controller.session().state();
    match controller
        .current_question()
        .and_then(|q| state.answers.get(&q.id))
    {
        Some(answer) => println!("Q{question}: {answer}"),
        None => println!("Q{question}: cleared"),
    }
    Ok(())
}
