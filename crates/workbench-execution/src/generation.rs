//! One-shot commands: debug-trace generation and formatting.
//!
//! Source text goes in on stdin; the command's stdout is the result.

use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use workbench_core::config::CommandSpec;
use workbench_core::error::{Result, WorkbenchError};

/// JSON printed by a debug-trace generator.
#[derive(Debug, Deserialize)]
pub(crate) struct GenerationResponse {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl GenerationResponse {
    pub(crate) fn into_data(self) -> Result<Value> {
        if self.success {
            Ok(self.data.unwrap_or(Value::Null))
        } else {
            Err(WorkbenchError::generation(
                self.error
                    .unwrap_or_else(|| "debug trace generation failed".to_string()),
            ))
        }
    }
}

/// Parses the stdout of a debug-trace generator.
pub(crate) fn parse_trace(stdout: &str) -> Result<Value> {
    let response: GenerationResponse = serde_json::from_str(stdout.trim()).map_err(|e| {
        tracing::warn!("[Generation] Invalid debug response: {}", e);
        WorkbenchError::generation(format!("Invalid debug response: {}", e))
    })?;
    response.into_data()
}

/// Runs `spec` with `input` on stdin and returns its stdout.
///
/// Non-zero exit, spawn failure and timeout all become generation errors
/// carrying a message fit for the user.
pub(crate) async fn run_one_shot(spec: &CommandSpec, input: &str, timeout: Duration) -> Result<String> {
    let mut child = Command::new(&spec.program)
        .args(&spec.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            tracing::error!("[Generation] Failed to spawn {}: {}", spec.program, e);
            WorkbenchError::generation(format!("Failed to start {}: {}", spec.program, e))
        })?;

    let stdin = child.stdin.take();
    let feed = async move {
        if let Some(mut stdin) = stdin {
            // A tool that exits without reading its input is reported through its exit status.
            if let Err(e) = stdin.write_all(input.as_bytes()).await {
                tracing::debug!("[Generation] {} closed stdin early: {}", spec.program, e);
            }
        }
    };

    // Stdin is fed while stdout is drained, so a tool that streams can never
    // block on a full pipe.
    let exchange = async {
        let ((), output) = tokio::join!(feed, child.wait_with_output());
        output
    };

    let output = match tokio::time::timeout(timeout, exchange).await {
        Ok(output) => output?,
        Err(_) => {
            tracing::warn!("[Generation] {} timed out after {:?}", spec.program, timeout);
            return Err(WorkbenchError::generation(format!(
                "{} timed out after {} seconds",
                spec.program,
                timeout.as_secs_f32()
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = stderr.trim();
        tracing::debug!("[Generation] {} failed: {}", spec.program, message);
        return Err(WorkbenchError::generation(if message.is_empty() {
            format!("{} failed with {}", spec.program, output.status)
        } else {
            message.to_string()
        }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_success() {
        let data = parse_trace(r#"{"success": true, "data": {"trace": [1, 2]}}"#).unwrap();
        assert_eq!(data, json!({"trace": [1, 2]}));
    }

    #[test]
    fn test_parse_failure_carries_message() {
        let err = parse_trace(r#"{"success": false, "error": "ParseError: unexpected )"}"#)
            .unwrap_err();
        assert_eq!(err, WorkbenchError::generation("ParseError: unexpected )"));
    }

    #[test]
    fn test_parse_garbage() {
        let err = parse_trace("Traceback (most recent call last)").unwrap_err();
        assert!(err.is_generation());
        assert!(err.user_message().starts_with("Invalid debug response"));
    }
}
