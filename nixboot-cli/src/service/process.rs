//! External process helpers
//!
//! Runs a command to completion with captured output, logging both streams
//! at debug level.

use anyhow::{Context, Result};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Captured result of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// One-line description of a failure for operator-facing messages
    pub fn failure_detail(&self) -> String {
        let status = match self.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };

        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            status
        } else {
            format!("{}: {}", status, stderr)
        }
    }
}

/// Runs `command` with stdin closed and both output streams captured
///
/// Only a failure to spawn or wait is an error; a non-zero exit is reported
/// through `CommandOutput::success`.
///
/// # Arguments
/// * `command` - Fully configured command
/// * `description` - Short name used in logs and error context (e.g. "git clone")
pub async fn run_captured(mut command: Command, description: &str) -> Result<CommandOutput> {
    debug!("Running {}: {:?}", description, command.as_std());

    let output = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .with_context(|| format!("Failed to execute {}", description))?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if !stdout.trim().is_empty() {
        debug!("{} stdout: {}", description, stdout.trim());
    }
    if !stderr.trim().is_empty() {
        debug!("{} stderr: {}", description, stderr.trim());
    }

    Ok(CommandOutput {
        success: output.status.success(),
        exit_code: output.status.code(),
        stdout,
        stderr,
    })
}
