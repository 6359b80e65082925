//! System builder service
//!
//! Builds and installs the fetched configuration for one target. The build
//! can run for a long time, so its output goes straight to the terminal.

use anyhow::{Context, Result};
use async_trait::async_trait;
use nixboot_core::TargetIdentifier;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{error, info};

use crate::privilege::Elevation;

/// Outcome of a system build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Succeeded,
    Failed { detail: String },
}

/// Service trait for the declarative system build
#[async_trait]
pub trait SystemBuilder: Send + Sync {
    /// Builds `source` for `target` and installs the result
    ///
    /// # Errors
    /// Only when the builder cannot be started; a failing build is
    /// `BuildOutcome::Failed`
    async fn build(
        &self,
        elevation: &Elevation,
        source: &Path,
        target: &TargetIdentifier,
    ) -> Result<BuildOutcome>;
}

/// nixos-install implementation of SystemBuilder
pub struct NixosInstall {
    program: String,
}

impl NixosInstall {
    /// Creates a builder invoking `program` (normally "nixos-install")
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Flake reference `<source>#<target>`
    pub fn flake_ref(source: &Path, target: &TargetIdentifier) -> String {
        format!("{}#{}", source.display(), target)
    }

    fn command(&self, elevation: &Elevation, source: &Path, target: &TargetIdentifier) -> Command {
        let mut command = elevation.command(&self.program);
        command
            .arg("--no-root-passwd")
            .arg("--flake")
            .arg(Self::flake_ref(source, target));
        command
    }
}

#[async_trait]
impl SystemBuilder for NixosInstall {
    async fn build(
        &self,
        elevation: &Elevation,
        source: &Path,
        target: &TargetIdentifier,
    ) -> Result<BuildOutcome> {
        info!(
            "Building {} with {}",
            Self::flake_ref(source, target),
            self.program
        );

        let status = self
            .command(elevation, source, target)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .with_context(|| format!("Failed to execute {}", self.program))?;

        if status.success() {
            return Ok(BuildOutcome::Succeeded);
        }

        let detail = match status.code() {
            Some(code) => format!("{} exited with code {}", self.program, code),
            None => format!("{} was terminated by a signal", self.program),
        };
        error!("{}", detail);
        Ok(BuildOutcome::Failed { detail })
    }
}
