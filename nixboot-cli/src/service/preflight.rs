//! Pre-flight checks
//!
//! Verifies that the external programs the pipeline shells out to are
//! installed before any stage runs.

use anyhow::Result;
use std::ffi::OsStr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Finds an executable named `program` on `search_path`
///
/// Programs containing a `/` are checked as given.
pub fn find_program(program: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if program.contains('/') {
        let path = Path::new(program);
        return is_executable(path).then(|| path.to_path_buf());
    }

    let search_path = search_path?;
    std::env::split_paths(search_path)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Fails with the names of every program missing from `PATH`
pub fn require_programs(programs: &[&str]) -> Result<()> {
    let search_path = std::env::var_os("PATH");

    let missing: Vec<&str> = programs
        .iter()
        .copied()
        .filter(|program| match find_program(program, search_path.as_deref()) {
            Some(found) => {
                debug!("Found {} at {}", program, found.display());
                false
            }
            None => true,
        })
        .collect();

    if !missing.is_empty() {
        anyhow::bail!(
            "required program(s) not found on PATH: {}",
            missing.join(", ")
        );
    }

    info!("All required programs are available");
    Ok(())
}
