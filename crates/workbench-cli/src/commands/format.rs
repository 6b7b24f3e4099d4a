use std::path::Path;

use anyhow::{Result, bail};
use colored::Colorize;

use super::context::{AlreadyReported, Workbench};

pub async fn execute(workbench: &Workbench, file: &Path, write: bool) -> Result<()> {
    let mut controller = workbench.open(file)?;
    controller.format().await.map_err(|_| AlreadyReported)?;

    if !write {
        print!("{}", controller.editor_text());
        return Ok(());
    }

    if !controller.has_unsaved_changes() {
        println!("{} {}", "Unchanged".bright_black(), file.display());
        return Ok(());
    }
    if !controller.save().await {
        bail!("Failed to save {}", file.display());
    }
    println!("{} {}", "Formatted".green(), file.display());
    Ok(())
}
