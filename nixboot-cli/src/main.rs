//! nixboot
//!
//! Bootstraps a fresh NixOS machine from a private configuration repository.
//!
//! Architecture:
//! - Configuration: flags with environment fallbacks, validated up front
//! - Services: external collaborators (ssh-keygen, git, coreutils, the
//!   system builder, the operator at the terminal)
//! - Pipeline: the eight bootstrap stages, run strictly in order
//!
//! The process exits 0 only after the system has been installed and the
//! transient deploy key retired; every fatal error exits 1.

mod config;
mod console;
mod pipeline;
mod privilege;
mod service;

use clap::Parser;
use nixboot_core::Layout;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{
    Config, DEFAULT_BUILDER, DEFAULT_ESCALATE_WITH, DEFAULT_GIT_HOST, DEFAULT_KEY_COMMENT,
};
use crate::pipeline::{Bootstrap, Services};
use crate::privilege::Elevation;
use crate::service::{
    CommandFs, NixosInstall, SshGitTransport, SshKeygen, TerminalOperator, require_programs,
};

#[derive(Parser)]
#[command(name = "nixboot")]
#[command(about = "Bootstrap a NixOS machine from a private configuration repository", long_about = None)]
struct Cli {
    /// Configuration repository (owner/name or git@host:owner/name.git);
    /// prompted for when absent or invalid
    #[arg(long = "repo", env = "NIXBOOT_REPO")]
    repository: Option<String>,

    /// Host used to expand owner/name references
    #[arg(long, env = "NIXBOOT_GIT_HOST", default_value = DEFAULT_GIT_HOST)]
    git_host: String,

    /// Program used to run privileged commands when not root
    #[arg(long, env = "NIXBOOT_ESCALATE_WITH", default_value = DEFAULT_ESCALATE_WITH)]
    escalate_with: String,

    /// Program that builds and installs the system
    #[arg(long, env = "NIXBOOT_BUILDER", default_value = DEFAULT_BUILDER)]
    builder: String,

    /// Label embedded in the generated deploy key
    #[arg(long, env = "NIXBOOT_KEY_COMMENT", default_value = DEFAULT_KEY_COMMENT)]
    key_comment: String,

    /// Log level for diagnostics on stderr (error, warn, info, debug, trace)
    #[arg(long, env = "NIXBOOT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Increase diagnostic verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> &str {
        match (&self.log_level, self.verbose) {
            (Some(level), _) => level,
            (None, 0) => "warn",
            (None, 1) => "info",
            (None, _) => "debug",
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let level = cli.log_level().to_string();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("nixboot={level},nixboot_core={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config {
        repository: cli.repository,
        git_host: cli.git_host,
        escalate_with: cli.escalate_with,
        builder: cli.builder,
        key_comment: cli.key_comment,
    };

    if let Err(e) = config.validate() {
        console::fatal("Configuration", &format!("{:#}", e));
        return ExitCode::FAILURE;
    }

    let layout = match Layout::standard() {
        Ok(layout) => layout,
        Err(e) => {
            console::fatal("Configuration", &e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let elevation = Elevation::acquire(&config.escalate_with);

    let mut programs = vec!["ssh-keygen", "git", config.builder.as_str()];
    if let Some(program) = elevation.escalation_program() {
        programs.push(program);
    }
    if let Err(e) = require_programs(&programs) {
        console::fatal("Pre-flight check", &format!("{:#}", e));
        return ExitCode::FAILURE;
    }

    info!(
        "Starting bootstrap: git_host={}, builder={}, elevation={:?}",
        config.git_host,
        config.builder,
        elevation.escalation_program()
    );

    let services = Services {
        operator: Arc::new(TerminalOperator::new()),
        keygen: Arc::new(SshKeygen::new()),
        git: Arc::new(SshGitTransport::new()),
        fs: Arc::new(CommandFs),
        builder: Arc::new(NixosInstall::new(config.builder.clone())),
    };

    let bootstrap = Bootstrap::new(config, layout, elevation, services);
    match bootstrap.run().await {
        Ok(report) => {
            info!(
                "Bootstrap of {} finished (key reused: {}, probes: {})",
                report.target, report.reused_key, report.probe_attempts
            );
            console::summary(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Bootstrap failed: {}", e);
            console::fatal(&e.stage().to_string(), &e.to_string());
            ExitCode::FAILURE
        }
    }
}
