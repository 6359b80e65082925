//! Key generation service
//!
//! Creates the deploy keypair with ssh-keygen. The generator never
//! overwrites an existing private key, whatever the caller checked before.

use anyhow::{Context, Result};
use async_trait::async_trait;
use nixboot_core::DeployCredential;
use std::os::unix::fs::DirBuilderExt;
use tokio::process::Command;
use tracing::info;

use super::process::run_captured;

/// Service trait for deploy key generation
#[async_trait]
pub trait KeyGenerator: Send + Sync {
    /// Generates a fresh passphrase-less keypair at the credential's path
    ///
    /// # Arguments
    /// * `credential` - Where the keypair goes and which algorithm to use
    /// * `label` - Comment embedded in the public key
    ///
    /// # Errors
    /// Fails if the private half already exists or generation fails
    async fn generate(&self, credential: &DeployCredential, label: &str) -> Result<()>;

    /// Rewrites the public half from an existing private half
    async fn derive_public(&self, credential: &DeployCredential) -> Result<()>;
}

/// ssh-keygen implementation of KeyGenerator
pub struct SshKeygen {
    program: String,
}

impl SshKeygen {
    /// Creates a generator using `ssh-keygen` from PATH
    pub fn new() -> Self {
        Self {
            program: "ssh-keygen".to_string(),
        }
    }

    /// Creates the key directory (0700) if it is missing
    fn ensure_key_dir(credential: &DeployCredential) -> Result<()> {
        if let Some(dir) = credential.private_key().parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::DirBuilder::new()
                    .recursive(true)
                    .mode(0o700)
                    .create(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }
        Ok(())
    }
}

impl Default for SshKeygen {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyGenerator for SshKeygen {
    async fn generate(&self, credential: &DeployCredential, label: &str) -> Result<()> {
        let path = credential.private_key();
        if path.exists() {
            anyhow::bail!("refusing to overwrite existing key {}", path.display());
        }

        Self::ensure_key_dir(credential)?;

        info!(
            "Generating {} deploy key at {}",
            credential.algorithm(),
            path.display()
        );

        let mut command = Command::new(&self.program);
        command
            .arg("-q")
            .arg("-t")
            .arg(credential.algorithm().as_str())
            .arg("-f")
            .arg(path)
            .arg("-N")
            .arg("")
            .arg("-C")
            .arg(label);

        let output = run_captured(command, "ssh-keygen").await?;
        if !output.success {
            anyhow::bail!("ssh-keygen failed with {}", output.failure_detail());
        }

        Ok(())
    }

    async fn derive_public(&self, credential: &DeployCredential) -> Result<()> {
        let mut command = Command::new(&self.program);
        command.arg("-y").arg("-f").arg(credential.private_key());

        let output = run_captured(command, "ssh-keygen -y").await?;
        if !output.success {
            anyhow::bail!(
                "could not read public key from {}: {}",
                credential.private_key().display(),
                output.failure_detail()
            );
        }

        let public_key = credential.public_key();
        std::fs::write(&public_key, output.stdout)
            .with_context(|| format!("Failed to write {}", public_key.display()))?;

        Ok(())
    }
}
