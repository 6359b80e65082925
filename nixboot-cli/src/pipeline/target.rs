//! Target resolution stage

use nixboot_core::{Result, TargetIdentifier, resolve_target};
use std::path::Path;
use tracing::info;

use crate::service::{Notice, Operator};

/// Reads the build target from the host configuration in `checkout`
pub fn resolve(operator: &dyn Operator, checkout: &Path) -> Result<TargetIdentifier> {
    let target = resolve_target(checkout)?;

    info!("Build target is {}", target);
    operator.notify(Notice::Success(format!("Target host: {}", target)));
    Ok(target)
}
