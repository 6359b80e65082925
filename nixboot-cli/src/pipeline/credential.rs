//! Deploy key provisioning stage
//!
//! Idempotent: an existing keypair is reused untouched, a private key whose
//! public half went missing gets the public half derived again, and only a
//! missing private key leads to a new keypair.

use nixboot_core::{BootstrapError, DeployCredential, Result};
use tracing::{info, warn};

use crate::service::{KeyGenerator, Notice, Operator};

/// Makes sure the deploy keypair exists
///
/// # Returns
/// `true` when an existing private key was reused
pub async fn provision(
    operator: &dyn Operator,
    keygen: &dyn KeyGenerator,
    credential: &DeployCredential,
    label: &str,
) -> Result<bool> {
    let path = credential.private_key();
    let failed = |message: String| BootstrapError::KeyGeneration {
        path: path.to_path_buf(),
        message,
    };

    if credential.exists() {
        info!("Reusing deploy key at {}", path.display());
        operator.notify(Notice::Info(format!(
            "Deploy key already exists at {}, reusing it",
            path.display()
        )));
        return Ok(true);
    }

    if path.is_file() {
        warn!("Public half of {} is missing, deriving it", path.display());
        keygen
            .derive_public(credential)
            .await
            .map_err(|e| failed(format!("{:#}", e)))?;
        operator.notify(Notice::Info(format!(
            "Restored public key {} from the existing private key",
            credential.public_key().display()
        )));
        return Ok(true);
    }

    // A public half without its private key is a leftover and would be
    // replaced by the new pair anyway.
    let public_key = credential.public_key();
    if public_key.exists() {
        warn!("Removing orphaned public key {}", public_key.display());
        std::fs::remove_file(&public_key).map_err(|e| {
            failed(format!(
                "could not remove orphaned {}: {}",
                public_key.display(),
                e
            ))
        })?;
    }

    keygen
        .generate(credential, label)
        .await
        .map_err(|e| failed(format!("{:#}", e)))?;

    if !credential.exists() {
        return Err(failed(
            "key generator reported success but the keypair is missing".to_string(),
        ));
    }

    operator.notify(Notice::Success(format!(
        "Generated {} deploy key at {}",
        credential.algorithm(),
        path.display()
    )));
    Ok(false)
}
