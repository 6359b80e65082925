//! Error types for the bootstrap pipeline
//!
//! Every variant is fatal: the pipeline reports it once, labelled with the
//! stage it came from, and exits non-zero. Connectivity failures are not
//! represented here because they are retried, not reported.

use std::path::PathBuf;
use thiserror::Error;

use crate::stage::Stage;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, BootstrapError>;

/// Fatal conditions that terminate the bootstrap
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Operator input reached end of file while a prompt was pending
    #[error("operator input closed while waiting for {prompt}")]
    InputClosed {
        /// What the pipeline was waiting for
        prompt: String,
    },

    /// Operator input could not be read at all
    #[error("failed to read operator input while waiting for {prompt}: {message}")]
    InputRead { prompt: String, message: String },

    /// The home directory holding the transient key could not be resolved
    #[error("could not determine the home directory for the deploy key")]
    HomeDirectory,

    /// Key generation failed
    #[error("failed to generate deploy key at {}: {message}", path.display())]
    KeyGeneration { path: PathBuf, message: String },

    /// The public half could not be read for registration
    #[error("failed to read public key {}: {source}", path.display())]
    PublicKeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The reachability probe could not be executed at all
    #[error("failed to run reachability probe against {url}: {message}")]
    Probe { url: String, message: String },

    /// A leftover checkout from an earlier run could not be removed
    #[error("failed to remove stale checkout {}: {message}", path.display())]
    StaleCheckout { path: PathBuf, message: String },

    /// Cloning the configuration repository failed
    #[error("failed to clone {url} into {}: {message}", destination.display())]
    Clone {
        url: String,
        destination: PathBuf,
        message: String,
    },

    /// Writing the persisted credential failed
    #[error("failed to persist deploy key to {}: {message}", destination.display())]
    Persist {
        destination: PathBuf,
        message: String,
    },

    /// The host configuration file could not be read
    #[error("failed to read {}: {source}", file.display())]
    TargetRead {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The host configuration file has no usable hostname assignment
    #[error(
        "no non-empty `networking.hostName = \"...\";` assignment found in {}",
        file.display()
    )]
    TargetNotFound { file: PathBuf },

    /// The system build failed
    #[error("system build for target `{target}` failed: {message}")]
    Build { target: String, message: String },

    /// The build succeeded but the transient key could not be removed
    #[error("system installed but the transient deploy key at {} could not be removed: {message}", path.display())]
    Cleanup { path: PathBuf, message: String },
}

impl BootstrapError {
    /// The pipeline stage this error belongs to
    pub fn stage(&self) -> Stage {
        match self {
            Self::InputClosed { .. } | Self::InputRead { .. } => Stage::Input,
            Self::HomeDirectory | Self::KeyGeneration { .. } => Stage::Credential,
            Self::PublicKeyRead { .. } => Stage::Registration,
            Self::Probe { .. } => Stage::Connectivity,
            Self::StaleCheckout { .. } | Self::Clone { .. } => Stage::Fetch,
            Self::Persist { .. } => Stage::Persist,
            Self::TargetRead { .. } | Self::TargetNotFound { .. } => Stage::Target,
            Self::Build { .. } | Self::Cleanup { .. } => Stage::Pivot,
        }
    }

    /// Build an `InputClosed` error for the given prompt
    pub fn input_closed(prompt: impl Into<String>) -> Self {
        Self::InputClosed {
            prompt: prompt.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_map_to_their_stage() {
        let err = BootstrapError::TargetNotFound {
            file: PathBuf::from("/tmp/real-config/configuration.nix"),
        };
        assert_eq!(err.stage(), Stage::Target);

        let err = BootstrapError::Build {
            target: "nixbox".to_string(),
            message: "exit status 1".to_string(),
        };
        assert_eq!(err.stage(), Stage::Pivot);

        assert_eq!(BootstrapError::HomeDirectory.stage(), Stage::Credential);
        assert_eq!(
            BootstrapError::input_closed("the repository").stage(),
            Stage::Input
        );
    }

    #[test]
    fn test_error_messages_name_the_cause() {
        let err = BootstrapError::Clone {
            url: "git@github.com:alice/homelab.git".to_string(),
            destination: PathBuf::from("/tmp/real-config"),
            message: "No space left on device".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("git@github.com:alice/homelab.git"));
        assert!(message.contains("/tmp/real-config"));
        assert!(message.contains("No space left on device"));
    }
}
