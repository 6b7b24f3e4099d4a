use std::path::Path;

use anyhow::{Context, Result};

use super::context::{AlreadyReported, Workbench};

/// Generates a trace for `file` and writes the trace data as JSON.
pub async fn execute(workbench: &Workbench, file: &Path, output: Option<&Path>) -> Result<()> {
    let mut controller = workbench.open(file)?;
    controller.debug(None).await.map_err(|_| AlreadyReported)?;

    let data = controller
        .debugger_data()
        .context("No trace was produced")?;
    let json = serde_json::to_string_pretty(data)?;

    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}
