//! Nixboot Core
//!
//! Core types for the nixboot bootstrapper.
//!
//! This crate contains:
//! - Domain types: repository references, the deploy credential, the
//!   build target and the fixed filesystem layout
//! - Stage labels for the bootstrap pipeline
//! - The fatal error type shared by every stage
//!
//! Nothing in here spawns processes or talks to a terminal; that lives in
//! the CLI crate.

pub mod domain;
pub mod error;
pub mod stage;

pub use domain::credential::{DeployCredential, KeyAlgorithm};
pub use domain::layout::Layout;
pub use domain::repository::{ReferenceError, RepositoryReference};
pub use domain::target::{HOST_CONFIG_FILE, TargetIdentifier, extract_target, resolve_target};
pub use error::{BootstrapError, Result};
pub use stage::Stage;
