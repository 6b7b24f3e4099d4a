use std::path::Path;

use anyhow::{Context, Result};
use workbench_core::language::Language;

use super::context::file_name;

pub fn execute(file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    println!("{}", Language::detect(&file_name(file)?, &content));
    Ok(())
}
