//! Service layer
//!
//! Services wrap the external collaborators of the bootstrap: the operator
//! at the terminal, ssh-keygen, git, privileged filesystem commands and the
//! system builder. The pipeline only sees the traits, so tests swap in
//! scripted fakes.

mod builder;
mod fs;
mod git;
mod keygen;
mod operator;
mod preflight;
mod process;

// Re-export traits
pub use builder::SystemBuilder;
pub use fs::PrivilegedFs;
pub use git::GitTransport;
pub use keygen::KeyGenerator;
pub use operator::Operator;

// Re-export implementations
pub use builder::NixosInstall;
pub use fs::CommandFs;
pub use git::SshGitTransport;
pub use keygen::SshKeygen;
pub use operator::TerminalOperator;

// Re-export supporting types
pub use builder::BuildOutcome;
pub use git::ProbeOutcome;
pub use operator::Notice;
pub use preflight::require_programs;
