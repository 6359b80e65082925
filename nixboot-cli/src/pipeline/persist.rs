//! Secret persistence stage
//!
//! Copies the private key to durable storage on the target so the installed
//! system can keep pulling its configuration after the pivot.

use nixboot_core::{BootstrapError, DeployCredential, Result};
use std::path::Path;
use tracing::info;

use crate::privilege::Elevation;
use crate::service::{Notice, Operator, PrivilegedFs};

/// Installs the private key at `destination` inside `secrets_dir`
pub async fn persist_credential(
    operator: &dyn Operator,
    fs: &dyn PrivilegedFs,
    elevation: &Elevation,
    credential: &DeployCredential,
    secrets_dir: &Path,
    destination: &Path,
) -> Result<()> {
    let failed = |e: anyhow::Error| BootstrapError::Persist {
        destination: destination.to_path_buf(),
        message: format!("{:#}", e),
    };

    fs.create_dir_all(elevation, secrets_dir)
        .await
        .map_err(failed)?;
    fs.install_secret(elevation, credential.private_key(), destination)
        .await
        .map_err(failed)?;

    info!("Deploy key persisted to {}", destination.display());
    operator.notify(Notice::Success(format!(
        "Deploy key persisted to {}",
        destination.display()
    )));
    Ok(())
}
