use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;

use super::context::config_service;

pub fn path(config_path: Option<PathBuf>) -> Result<()> {
    println!("{}", config_service(config_path)?.path().display());
    Ok(())
}

pub async fn init(config_path: Option<PathBuf>) -> Result<()> {
    let service = config_service(config_path)?;
    if service.ensure_default().await? {
        println!("{} {}", "Created".green(), service.path().display());
    } else {
        println!("{} {}", "Exists".bright_black(), service.path().display());
    }
    Ok(())
}
