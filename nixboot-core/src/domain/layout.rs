//! Fixed filesystem layout
//!
//! The operator cannot move any of these paths; the post-install system and
//! its automation agent expect the persisted key at exactly this location.

use std::path::{Path, PathBuf};

use crate::domain::credential::DeployCredential;
use crate::error::{BootstrapError, Result};

/// File name of the transient deploy key inside `~/.ssh`
pub const DEPLOY_KEY_FILE: &str = "bootstrap_deploy_key";

/// Transient checkout of the fetched configuration
pub const CHECKOUT_DIR: &str = "/tmp/real-config";

/// Secrets directory on the target's durable storage
pub const SECRETS_DIR: &str = "/mnt/persist/secrets";

/// File name of the persisted deploy key inside the secrets directory
pub const PERSISTED_KEY_FILE: &str = "deploy_key";

/// Where each artefact of the bootstrap lives on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    deploy_key: PathBuf,
    checkout_dir: PathBuf,
    secrets_dir: PathBuf,
}

impl Layout {
    /// The standard layout rooted at the invoking user's home directory
    pub fn standard() -> Result<Self> {
        let home = dirs::home_dir().ok_or(BootstrapError::HomeDirectory)?;
        Ok(Self::for_home(&home))
    }

    /// The standard layout for an explicit home directory
    pub fn for_home(home: &Path) -> Self {
        Self::new(
            home.join(".ssh").join(DEPLOY_KEY_FILE),
            CHECKOUT_DIR,
            SECRETS_DIR,
        )
    }

    /// Builds a layout from explicit locations
    ///
    /// Used by tests to root every path in a temporary directory.
    pub fn new(
        deploy_key: impl Into<PathBuf>,
        checkout_dir: impl Into<PathBuf>,
        secrets_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            deploy_key: deploy_key.into(),
            checkout_dir: checkout_dir.into(),
            secrets_dir: secrets_dir.into(),
        }
    }

    /// Handle to the transient deploy credential
    pub fn credential(&self) -> DeployCredential {
        DeployCredential::new(&self.deploy_key)
    }

    pub fn checkout_dir(&self) -> &Path {
        &self.checkout_dir
    }

    pub fn secrets_dir(&self) -> &Path {
        &self.secrets_dir
    }

    /// Destination of the persisted private key
    pub fn persisted_key(&self) -> PathBuf {
        self.secrets_dir.join(PERSISTED_KEY_FILE)
    }
}
