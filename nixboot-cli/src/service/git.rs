//! Git transport service
//!
//! Probes and clones the configuration repository over SSH, authenticated
//! with the deploy key and nothing else.
//!
//! Every git invocation gets a `GIT_SSH_COMMAND` that:
//! - ignores user and system ssh_config (`-F /dev/null`), whose
//!   `IdentityFile` entries would otherwise be offered as well
//! - offers only the deploy key (`IdentitiesOnly`, no agent)
//! - never prompts (`BatchMode`)
//! - accepts an unknown host key once and pins it in known_hosts
//!   (`StrictHostKeyChecking=accept-new`); a changed key is still rejected

use anyhow::{Context, Result};
use async_trait::async_trait;
use nixboot_core::{DeployCredential, RepositoryReference};
use shell_escape::escape;
use std::borrow::Cow;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

use super::process::run_captured;

/// Result of a reachability probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable,
    /// The remote refused or could not be reached; worth retrying after the
    /// operator fixes the registration
    Unreachable { detail: String },
}

/// Service trait for remote repository access
#[async_trait]
pub trait GitTransport: Send + Sync {
    /// Checks whether the repository can be read with the credential
    ///
    /// # Errors
    /// Only when the probe itself cannot run (e.g. git is missing);
    /// an unreachable remote is `ProbeOutcome::Unreachable`
    async fn probe(
        &self,
        repository: &RepositoryReference,
        credential: &DeployCredential,
    ) -> Result<ProbeOutcome>;

    /// Clones the repository into `destination`, which must not exist
    async fn clone_into(
        &self,
        repository: &RepositoryReference,
        credential: &DeployCredential,
        destination: &Path,
    ) -> Result<()>;
}

/// Builds the `GIT_SSH_COMMAND` restricting ssh to the deploy key
pub fn ssh_command(credential: &DeployCredential) -> String {
    let key = credential.private_key().to_string_lossy();
    format!(
        "ssh -F /dev/null -i {} -o IdentitiesOnly=yes -o IdentityAgent=none -o BatchMode=yes -o StrictHostKeyChecking=accept-new",
        escape(Cow::Borrowed(&key))
    )
}

/// git over SSH implementation of GitTransport
pub struct SshGitTransport {
    program: String,
}

impl SshGitTransport {
    /// Creates a transport using `git` from PATH
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
        }
    }

    /// Base git command carrying the credential environment
    fn git(&self, credential: &DeployCredential) -> Command {
        let mut command = Command::new(&self.program);
        command
            .env("GIT_SSH_COMMAND", ssh_command(credential))
            .env("GIT_TERMINAL_PROMPT", "0");
        command
    }
}

impl Default for SshGitTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitTransport for SshGitTransport {
    async fn probe(
        &self,
        repository: &RepositoryReference,
        credential: &DeployCredential,
    ) -> Result<ProbeOutcome> {
        let url = repository.transport_url();
        debug!("Probing {}", url);

        let mut command = self.git(credential);
        command.arg("ls-remote").arg("--quiet").arg(&url).arg("HEAD");

        let output = run_captured(command, "git ls-remote").await?;
        if output.success {
            info!("{} is reachable", url);
            Ok(ProbeOutcome::Reachable)
        } else {
            Ok(ProbeOutcome::Unreachable {
                detail: output.failure_detail(),
            })
        }
    }

    async fn clone_into(
        &self,
        repository: &RepositoryReference,
        credential: &DeployCredential,
        destination: &Path,
    ) -> Result<()> {
        let url = repository.transport_url();
        info!("Cloning {} into {}", url, destination.display());

        let mut command = self.git(credential);
        command
            .arg("clone")
            .arg("--quiet")
            .arg(&url)
            .arg(destination);

        let output = run_captured(command, "git clone")
            .await
            .context("Failed to start clone")?;
        if !output.success {
            anyhow::bail!("git clone failed with {}", output.failure_detail());
        }

        Ok(())
    }
}
