//! Elevated execution capability
//!
//! Removing the stale checkout, writing the persisted secret and installing
//! the system all need root. Instead of assuming the process already runs as
//! root, those stages receive an `Elevation` and build their commands
//! through it.

use tokio::process::Command;
use tracing::debug;

/// Capability to run commands in the elevated execution context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elevation {
    /// Program prefixed to every command, `None` when already root
    escalate_with: Option<String>,
}

impl Elevation {
    /// Acquires the capability for this process
    ///
    /// Runs commands directly when the effective user is root, otherwise
    /// through `escalate_with`.
    pub fn acquire(escalate_with: &str) -> Self {
        if nix::unistd::geteuid().is_root() {
            debug!("Running as root, privileged commands run directly");
            Self::direct()
        } else {
            debug!("Privileged commands run through {}", escalate_with);
            Self::via(escalate_with)
        }
    }

    /// Commands run as-is
    pub fn direct() -> Self {
        Self {
            escalate_with: None,
        }
    }

    /// Commands are prefixed with `program`
    pub fn via(program: impl Into<String>) -> Self {
        Self {
            escalate_with: Some(program.into()),
        }
    }

    pub fn escalation_program(&self) -> Option<&str> {
        self.escalate_with.as_deref()
    }

    /// Builds a command for `program` under this capability
    pub fn command(&self, program: &str) -> Command {
        match &self.escalate_with {
            Some(escalate) => {
                let mut command = Command::new(escalate);
                command.arg(program);
                command
            }
            None => Command::new(program),
        }
    }
}
