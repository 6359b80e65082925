//! Privileged filesystem service
//!
//! Filesystem changes outside the operator's home directory. Each operation
//! takes the `Elevation` capability and runs a coreutils command under it.

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

use super::process::run_captured;
use crate::privilege::Elevation;

/// Service trait for filesystem changes that need elevated privilege
#[async_trait]
pub trait PrivilegedFs: Send + Sync {
    /// Removes `path` recursively; a missing path is not an error
    async fn remove_all(&self, elevation: &Elevation, path: &Path) -> Result<()>;

    /// Creates `dir` and any missing parents
    async fn create_dir_all(&self, elevation: &Elevation, dir: &Path) -> Result<()>;

    /// Copies `source` to `destination` and restricts it to mode 0600
    async fn install_secret(
        &self,
        elevation: &Elevation,
        source: &Path,
        destination: &Path,
    ) -> Result<()>;
}

/// Coreutils implementation of PrivilegedFs
pub struct CommandFs;

impl CommandFs {
    async fn run(
        elevation: &Elevation,
        program: &str,
        paths: &[&Path],
        flags: &[&str],
    ) -> Result<()> {
        let mut command = elevation.command(program);
        command.args(flags).arg("--").args(paths);

        let output = run_captured(command, program).await?;
        if !output.success {
            anyhow::bail!("{} failed with {}", program, output.failure_detail());
        }
        Ok(())
    }
}

#[async_trait]
impl PrivilegedFs for CommandFs {
    async fn remove_all(&self, elevation: &Elevation, path: &Path) -> Result<()> {
        debug!("Removing {}", path.display());
        Self::run(elevation, "rm", &[path], &["-rf"]).await
    }

    async fn create_dir_all(&self, elevation: &Elevation, dir: &Path) -> Result<()> {
        debug!("Creating {}", dir.display());
        Self::run(elevation, "mkdir", &[dir], &["-p"]).await
    }

    async fn install_secret(
        &self,
        elevation: &Elevation,
        source: &Path,
        destination: &Path,
    ) -> Result<()> {
        info!(
            "Installing {} to {} (mode 0600)",
            source.display(),
            destination.display()
        );
        Self::run(elevation, "cp", &[source, destination], &[]).await?;
        Self::run(elevation, "chmod", &[destination], &["600"]).await
    }
}
