//! Connectivity verification stage
//!
//! Retries are paced by the operator, not by a timer: after each failed
//! probe the stage waits for an acknowledgment before probing again. There
//! is no attempt limit and a failed probe never ends the run.

use nixboot_core::{BootstrapError, DeployCredential, RepositoryReference, Result};
use tracing::{info, warn};

use super::ask;
use crate::service::{GitTransport, Notice, Operator, ProbeOutcome};

const RETRY_PROMPT: &str = "Press Enter to try again";

/// Probes the repository until it is readable with the deploy key
///
/// # Returns
/// The number of probes it took
pub async fn verify(
    operator: &dyn Operator,
    git: &dyn GitTransport,
    repository: &RepositoryReference,
    credential: &DeployCredential,
) -> Result<u32> {
    let mut attempt: u32 = 1;

    loop {
        let outcome = git
            .probe(repository, credential)
            .await
            .map_err(|e| BootstrapError::Probe {
                url: repository.transport_url(),
                message: format!("{:#}", e),
            })?;

        match outcome {
            ProbeOutcome::Reachable => {
                info!("Repository reachable after {} attempt(s)", attempt);
                operator.notify(Notice::Success(format!(
                    "Deploy key can read {}",
                    repository
                )));
                return Ok(attempt);
            }
            ProbeOutcome::Unreachable { detail } => {
                warn!("Probe {} against {} failed: {}", attempt, repository, detail);
                operator.notify(Notice::Warning(format!(
                    "Cannot read {} with the deploy key ({})",
                    repository, detail
                )));
                operator.notify(Notice::Info(format!(
                    "Check the key is listed at {}",
                    repository.deploy_key_settings_url()
                )));

                ask(operator, RETRY_PROMPT, "the retry acknowledgment").await?;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{FakeGit, ScriptedOperator};

    fn unreachable() -> ProbeOutcome {
        ProbeOutcome::Unreachable {
            detail: "exit code 128: Permission denied (publickey)".to_string(),
        }
    }

    fn fixture() -> (RepositoryReference, DeployCredential) {
        (
            RepositoryReference::parse("alice/homelab", "github.com").unwrap(),
            DeployCredential::new("/nonexistent/bootstrap_deploy_key"),
        )
    }

    #[tokio::test]
    async fn test_first_probe_succeeds_without_prompt() {
        let (repository, credential) = fixture();
        let git = FakeGit::new(Vec::new(), None);
        let operator = ScriptedOperator::new(Vec::<&str>::new());

        let attempts = verify(&operator, &git, &repository, &credential)
            .await
            .unwrap();

        assert_eq!(attempts, 1);
        assert!(operator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_each_retry_waits_for_operator() {
        let (repository, credential) = fixture();
        let git = FakeGit::new(vec![unreachable(), unreachable(), unreachable()], None);
        let operator = ScriptedOperator::new(["", "", ""]);

        let attempts = verify(&operator, &git, &repository, &credential)
            .await
            .unwrap();

        assert_eq!(attempts, 4);
        assert_eq!(git.probe_calls(), 4);
        assert_eq!(operator.prompts(), vec![RETRY_PROMPT; 3]);
        assert_eq!(operator.warnings().len(), 3);
    }

    #[tokio::test]
    async fn test_never_proceeds_on_failure() {
        let (repository, credential) = fixture();
        // The operator walks away after the first retry prompt
        let git = FakeGit::new(vec![unreachable(), unreachable()], None);
        let operator = ScriptedOperator::new([""]);

        let err = verify(&operator, &git, &repository, &credential)
            .await
            .unwrap_err();

        assert!(matches!(err, BootstrapError::InputClosed { .. }));
        assert_eq!(git.probe_calls(), 2);
    }

    #[tokio::test]
    async fn test_probe_that_cannot_run_is_fatal() {
        let (repository, credential) = fixture();
        let git = FakeGit::new(Vec::new(), None).with_broken_probe("git: not found");
        let operator = ScriptedOperator::new(Vec::<&str>::new());

        let err = verify(&operator, &git, &repository, &credential)
            .await
            .unwrap_err();

        assert!(matches!(err, BootstrapError::Probe { .. }));
    }
}
