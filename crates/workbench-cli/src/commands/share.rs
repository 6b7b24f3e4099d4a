use std::path::Path;

use anyhow::{Result, bail};
use colored::Colorize;

use super::context::Workbench;

pub async fn execute(workbench: &Workbench, file: &Path) -> Result<()> {
    let mut controller = workbench.open(file)?;
    let Some(response) = controller.share().await else {
        bail!("Failed to share {}", file.display());
    };

    if let Some(link) = &response.link {
        println!("{} {}", "Link:".bold(), link.bright_cyan());
    }
    if let Some(location) = &response.location {
        println!("{} {}", "Copy:".bold(), location.display());
    }
    Ok(())
}
