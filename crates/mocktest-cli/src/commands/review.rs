//! The `mocktest review` command.

use std::path::PathBuf;

use anyhow::Result;

use super::open_live_session;

pub fn execute(question: u32, config: Option<PathBuf>) -> Result<()> {
    let (_, mut controller) = open_live_session(config.as_deref())?;
    controller.jump_to_number(question)?;

    if controller.toggle_review()? {
        println!("Q{question} marked for review");
    } else {
        println!("Q{question} review mark removed");
    }
    Ok(())
}
