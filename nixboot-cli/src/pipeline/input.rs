//! Repository input stage

use nixboot_core::{RepositoryReference, Result};
use tracing::{debug, info};

use super::ask;
use crate::service::{Notice, Operator};

const PROMPT: &str = "Configuration repository (owner/name or git@host:owner/name.git):";

/// Resolves the repository reference
///
/// A valid `preset` is used as-is. Otherwise the operator is prompted until
/// the input parses; there is no attempt limit.
pub async fn resolve_repository(
    operator: &dyn Operator,
    preset: Option<&str>,
    default_host: &str,
) -> Result<RepositoryReference> {
    if let Some(preset) = preset {
        match RepositoryReference::parse(preset, default_host) {
            Ok(repository) => {
                info!("Using preset repository {}", repository);
                operator.notify(Notice::Success(format!("Repository: {}", repository)));
                return Ok(repository);
            }
            Err(e) => {
                operator.notify(Notice::Warning(format!(
                    "Ignoring preset repository: {}",
                    e
                )));
            }
        }
    }

    loop {
        let line = ask(operator, PROMPT, "the repository reference").await?;

        match RepositoryReference::parse(&line, default_host) {
            Ok(repository) => {
                info!("Repository resolved to {}", repository);
                operator.notify(Notice::Success(format!("Repository: {}", repository)));
                return Ok(repository);
            }
            Err(e) => {
                debug!("Rejected repository input {:?}: {}", line, e);
                operator.notify(Notice::Warning(format!("{}, try again", e)));
            }
        }
    }
}
