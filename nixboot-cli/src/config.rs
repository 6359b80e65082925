//! Configuration module
//!
//! Runtime settings for the bootstrapper. Every value comes from a command
//! line flag with an environment variable fallback (see `main.rs`); the
//! filesystem layout is fixed and deliberately not part of this struct.

use nixboot_core::domain::repository::is_valid_host;

/// Default hosting platform for `owner/name` references
pub const DEFAULT_GIT_HOST: &str = "github.com";

/// Default program used to enter the elevated execution context
pub const DEFAULT_ESCALATE_WITH: &str = "sudo";

/// Default system build program
pub const DEFAULT_BUILDER: &str = "nixos-install";

/// Default label embedded in the generated public key
pub const DEFAULT_KEY_COMMENT: &str = "nixboot-deploy-key";

/// Bootstrapper configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository reference supplied up front, skipping the prompt when valid
    pub repository: Option<String>,

    /// Host used to expand `owner/name` references (e.g. "github.com")
    pub git_host: String,

    /// Program that runs a command with elevated privilege (e.g. "sudo")
    pub escalate_with: String,

    /// Program that builds and installs the fetched configuration
    pub builder: String,

    /// Label attached to the generated deploy key
    pub key_comment: String,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !is_valid_host(&self.git_host) {
            anyhow::bail!(
                "git_host must be a bare host name such as github.com, got '{}'",
                self.git_host
            );
        }

        if self.escalate_with.trim().is_empty() {
            anyhow::bail!("escalate_with cannot be empty");
        }

        if self.builder.trim().is_empty() {
            anyhow::bail!("builder cannot be empty");
        }

        if self.key_comment.trim().is_empty() {
            anyhow::bail!("key_comment cannot be empty");
        }

        if self.key_comment.contains('\n') {
            anyhow::bail!("key_comment must be a single line");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository: None,
            git_host: DEFAULT_GIT_HOST.to_string(),
            escalate_with: DEFAULT_ESCALATE_WITH.to_string(),
            builder: DEFAULT_BUILDER.to_string(),
            key_comment: DEFAULT_KEY_COMMENT.to_string(),
        }
    }
}
