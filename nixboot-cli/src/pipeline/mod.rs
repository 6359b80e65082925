//! Bootstrap pipeline
//!
//! Runs the stages strictly in order on a single task:
//! 1. Resolve the repository reference
//! 2. Provision the deploy key
//! 3. Wait for the operator to register it
//! 4. Verify the key can read the repository (operator-gated retries)
//! 5. Clone the configuration
//! 7. Resolve the build target from the clone
//! 6. Persist the private key to durable storage
//! 8. Install the system and retire the transient key
//!
//! The target is resolved before the secret is persisted so a configuration
//! without a host name stops the run before anything is written outside the
//! transient locations.
//!
//! Any stage error ends the run; nothing after it executes.

mod connectivity;
mod credential;
mod fetch;
mod input;
mod persist;
mod pivot;
mod registration;
mod target;

#[cfg(test)]
mod testing;

use nixboot_core::{BootstrapError, Layout, RepositoryReference, Result, Stage, TargetIdentifier};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::privilege::Elevation;
use crate::service::{GitTransport, KeyGenerator, Notice, Operator, PrivilegedFs, SystemBuilder};

/// Collaborators the pipeline drives
#[derive(Clone)]
pub struct Services {
    pub operator: Arc<dyn Operator>,
    pub keygen: Arc<dyn KeyGenerator>,
    pub git: Arc<dyn GitTransport>,
    pub fs: Arc<dyn PrivilegedFs>,
    pub builder: Arc<dyn SystemBuilder>,
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct BootstrapReport {
    pub repository: RepositoryReference,
    pub target: TargetIdentifier,
    pub persisted_key: PathBuf,
    /// Whether an existing deploy key was reused instead of generated
    pub reused_key: bool,
    /// Number of reachability probes until the repository answered
    pub probe_attempts: u32,
}

/// The bootstrap pipeline
pub struct Bootstrap {
    config: Config,
    layout: Layout,
    elevation: Elevation,
    services: Services,
}

impl Bootstrap {
    /// Creates a pipeline
    ///
    /// # Arguments
    /// * `config` - Validated configuration
    /// * `layout` - Filesystem layout (fixed in production)
    /// * `elevation` - Capability handed to the stages that need root
    /// * `services` - External collaborators
    pub fn new(config: Config, layout: Layout, elevation: Elevation, services: Services) -> Self {
        Self {
            config,
            layout,
            elevation,
            services,
        }
    }

    fn step(&self, stage: Stage) {
        info!("Stage {}/{}: {}", stage.number(), Stage::COUNT, stage);
        self.services.operator.notify(Notice::Step(stage));
    }

    /// Runs every stage in order
    ///
    /// # Returns
    /// A report of the finished bootstrap, or the first fatal error
    pub async fn run(&self) -> Result<BootstrapReport> {
        let operator = self.services.operator.as_ref();
        let credential = self.layout.credential();
        let checkout = self.layout.checkout_dir();

        self.step(Stage::Input);
        let repository = input::resolve_repository(
            operator,
            self.config.repository.as_deref(),
            &self.config.git_host,
        )
        .await?;

        self.step(Stage::Credential);
        let reused_key = credential::provision(
            operator,
            self.services.keygen.as_ref(),
            &credential,
            &self.config.key_comment,
        )
        .await?;

        self.step(Stage::Registration);
        registration::await_registration(operator, &repository, &credential).await?;

        self.step(Stage::Connectivity);
        let probe_attempts = connectivity::verify(
            operator,
            self.services.git.as_ref(),
            &repository,
            &credential,
        )
        .await?;

        self.step(Stage::Fetch);
        fetch::fetch_configuration(
            operator,
            self.services.git.as_ref(),
            self.services.fs.as_ref(),
            &self.elevation,
            &repository,
            &credential,
            checkout,
        )
        .await?;

        self.step(Stage::Target);
        let target = target::resolve(operator, checkout)?;

        self.step(Stage::Persist);
        let persisted_key = self.layout.persisted_key();
        persist::persist_credential(
            operator,
            self.services.fs.as_ref(),
            &self.elevation,
            &credential,
            self.layout.secrets_dir(),
            &persisted_key,
        )
        .await?;

        self.step(Stage::Pivot);
        pivot::pivot(
            operator,
            self.services.builder.as_ref(),
            &self.elevation,
            checkout,
            &target,
            &credential,
        )
        .await?;

        Ok(BootstrapReport {
            repository,
            target,
            persisted_key,
            reused_key,
            probe_attempts,
        })
    }
}

/// Reads one line from the operator, treating closed or unreadable input as fatal
///
/// # Arguments
/// * `prompt` - Text shown to the operator
/// * `waiting_for` - What the pipeline needs, used in the error message
pub(crate) async fn ask(operator: &dyn Operator, prompt: &str, waiting_for: &str) -> Result<String> {
    match operator.read_line(prompt).await {
        Ok(Some(line)) => Ok(line),
        Ok(None) => Err(BootstrapError::input_closed(waiting_for)),
        Err(e) => {
            warn!("Failed to read operator input: {:#}", e);
            Err(BootstrapError::InputRead {
                prompt: waiting_for.to_string(),
                message: format!("{:#}", e),
            })
        }
    }
}
