//! Registration gate stage

use nixboot_core::{BootstrapError, DeployCredential, RepositoryReference, Result};
use tracing::info;

use super::ask;
use crate::service::{Notice, Operator};

const PROMPT: &str = "Press Enter once the deploy key has been added";

/// Shows the public key and registration link, then waits for the operator
///
/// Whatever the operator types is ignored; the answer only marks that the
/// registration step happened.
pub async fn await_registration(
    operator: &dyn Operator,
    repository: &RepositoryReference,
    credential: &DeployCredential,
) -> Result<()> {
    let public_key = credential
        .read_public_key()
        .map_err(|source| BootstrapError::PublicKeyRead {
            path: credential.public_key(),
            source,
        })?;

    operator.notify(Notice::Registration {
        repository: repository.slug(),
        public_key,
        link: repository.deploy_key_settings_url(),
    });

    ask(operator, PROMPT, "the registration acknowledgment").await?;
    info!("Operator acknowledged deploy key registration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::ScriptedOperator;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_presents_key_and_link() {
        let dir = TempDir::new().unwrap();
        let credential = DeployCredential::new(dir.path().join("bootstrap_deploy_key"));
        std::fs::write(credential.private_key(), "PRIVATE").unwrap();
        std::fs::write(credential.public_key(), "ssh-ed25519 AAAA label\n").unwrap();
        let repository = RepositoryReference::parse("alice/homelab", "github.com").unwrap();

        // Any answer counts as acknowledgment
        let operator = ScriptedOperator::new(["definitely not yes"]);
        await_registration(&operator, &repository, &credential)
            .await
            .unwrap();

        assert_eq!(
            operator.notices(),
            vec![Notice::Registration {
                repository: "alice/homelab".to_string(),
                public_key: "ssh-ed25519 AAAA label".to_string(),
                link: "https://github.com/alice/homelab/settings/keys/new".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_missing_public_key_is_fatal() {
        let dir = TempDir::new().unwrap();
        let credential = DeployCredential::new(dir.path().join("bootstrap_deploy_key"));
        let repository = RepositoryReference::parse("alice/homelab", "github.com").unwrap();
        let operator = ScriptedOperator::new([""]);

        let err = await_registration(&operator, &repository, &credential)
            .await
            .unwrap_err();

        assert!(matches!(err, BootstrapError::PublicKeyRead { .. }));
        assert!(operator.prompts().is_empty());
    }
}
