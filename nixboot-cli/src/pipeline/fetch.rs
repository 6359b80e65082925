//! Configuration fetch stage

use nixboot_core::{BootstrapError, DeployCredential, RepositoryReference, Result};
use std::path::Path;
use tracing::info;

use crate::privilege::Elevation;
use crate::service::{GitTransport, Notice, Operator, PrivilegedFs};

/// Clones a fresh copy of the repository into `checkout`
///
/// Whatever an earlier run left at `checkout` is removed first, so the
/// clone never merges with stale content.
pub async fn fetch_configuration(
    operator: &dyn Operator,
    git: &dyn GitTransport,
    fs: &dyn PrivilegedFs,
    elevation: &Elevation,
    repository: &RepositoryReference,
    credential: &DeployCredential,
    checkout: &Path,
) -> Result<()> {
    fs.remove_all(elevation, checkout)
        .await
        .map_err(|e| BootstrapError::StaleCheckout {
            path: checkout.to_path_buf(),
            message: format!("{:#}", e),
        })?;

    git.clone_into(repository, credential, checkout)
        .await
        .map_err(|e| BootstrapError::Clone {
            url: repository.transport_url(),
            destination: checkout.to_path_buf(),
            message: format!("{:#}", e),
        })?;

    info!("Configuration checked out at {}", checkout.display());
    operator.notify(Notice::Success(format!(
        "Cloned {} into {}",
        repository,
        checkout.display()
    )));
    Ok(())
}
