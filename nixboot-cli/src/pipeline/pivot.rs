//! Install and pivot stage
//!
//! Builds the system from the checkout. Only a successful build retires the
//! transient deploy key; on failure the key stays so a rerun can reuse the
//! registration.

use nixboot_core::{BootstrapError, DeployCredential, Result, TargetIdentifier};
use std::path::Path;
use tracing::{error, info};

use crate::privilege::Elevation;
use crate::service::{BuildOutcome, Notice, Operator, SystemBuilder};

/// Builds `target` from `checkout`, then removes the transient keypair
pub async fn pivot(
    operator: &dyn Operator,
    builder: &dyn SystemBuilder,
    elevation: &Elevation,
    checkout: &Path,
    target: &TargetIdentifier,
    credential: &DeployCredential,
) -> Result<()> {
    let outcome = builder
        .build(elevation, checkout, target)
        .await
        .map_err(|e| BootstrapError::Build {
            target: target.to_string(),
            message: format!("{:#}", e),
        })?;

    if let BuildOutcome::Failed { detail } = outcome {
        error!("Build of {} failed, keeping the deploy key", target);
        return Err(BootstrapError::Build {
            target: target.to_string(),
            message: detail,
        });
    }

    operator.notify(Notice::Success(format!("System {} installed", target)));

    credential
        .remove()
        .map_err(|e| BootstrapError::Cleanup {
            path: credential.private_key().to_path_buf(),
            message: e.to_string(),
        })?;

    info!(
        "Removed transient deploy key {}",
        credential.private_key().display()
    );
    operator.notify(Notice::Info("Transient deploy key removed".to_string()));
    Ok(())
}
