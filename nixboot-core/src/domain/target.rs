//! Build target lookup
//!
//! The target is the host name declared in the fetched configuration. The
//! file is scanned as text for a single `networking.hostName = "...";`
//! assignment; the Nix language is not parsed.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

use crate::error::{BootstrapError, Result};

/// File inside the checkout that declares the host name
pub const HOST_CONFIG_FILE: &str = "configuration.nix";

// No `#` may precede the key on its line, so commented-out assignments never match.
static HOST_NAME_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[^#\r\n]*?\bnetworking\.hostName[ \t]*=[ \t]*"([^"\r\n]*)"[ \t]*;"#)
        .expect("hostname assignment pattern")
});

/// Non-empty name of the build target for this machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetIdentifier(String);

impl TargetIdentifier {
    /// Wraps a target name, rejecting blank names
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TargetIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extracts the first non-empty host name assignment from `source`
pub fn extract_target(source: &str) -> Option<TargetIdentifier> {
    HOST_NAME_ASSIGNMENT
        .captures_iter(source)
        .find_map(|caps| TargetIdentifier::new(&caps[1]))
}

/// Reads the host configuration file of a checkout and extracts its target
///
/// # Errors
/// - `TargetRead` if the file cannot be read
/// - `TargetNotFound` if it holds no non-empty assignment
pub fn resolve_target(checkout_dir: &Path) -> Result<TargetIdentifier> {
    let file = checkout_dir.join(HOST_CONFIG_FILE);
    debug!("Scanning {} for the host name", file.display());

    let source = std::fs::read_to_string(&file).map_err(|source| BootstrapError::TargetRead {
        file: file.clone(),
        source,
    })?;

    extract_target(&source).ok_or(BootstrapError::TargetNotFound { file })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extract_simple_assignment() {
        let source = r#"
{ config, pkgs, ... }:
{
  networking.hostName = "nixbox";
  time.timeZone = "Europe/Berlin";
}
"#;
        assert_eq!(extract_target(source).unwrap().as_str(), "nixbox");
    }

    #[test]
    fn test_extract_tolerates_spacing() {
        let source = "\tnetworking.hostName=\"edge-01\" ;\n";
        assert_eq!(extract_target(source).unwrap().as_str(), "edge-01");
    }

    #[test]
    fn test_extract_ignores_commented_lines() {
        let source = r#"
  # networking.hostName = "old";
  networking.hostName = "new";
"#;
        assert_eq!(extract_target(source).unwrap().as_str(), "new");
    }

    #[test]
    fn test_extract_skips_empty_values() {
        assert!(extract_target(r#"networking.hostName = "";"#).is_none());
        assert!(extract_target(r#"networking.hostName = "   ";"#).is_none());
    }

    #[test]
    fn test_extract_missing_assignment() {
        let source = r#"
{
  networking.networkmanager.enable = true;
  networking.hostName = lib.mkDefault "nixbox";
}
"#;
        assert!(extract_target(source).is_none());
    }

    #[test]
    fn test_extract_inline_assignment() {
        let source = "{ networking.hostName = \"nixbox\"; }\n";
        assert_eq!(extract_target(source).unwrap().as_str(), "nixbox");

        let source = "{ x = 1; } # networking.hostName = \"nixbox\";\n";
        assert!(extract_target(source).is_none());
    }

    #[test]
    fn test_resolve_target_reads_checkout() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(HOST_CONFIG_FILE), "{ x = 1; }\n").unwrap();
        assert!(matches!(
            resolve_target(dir.path()),
            Err(BootstrapError::TargetNotFound { .. })
        ));

        std::fs::write(
            dir.path().join(HOST_CONFIG_FILE),
            "{\n  networking.hostName = \"nixbox\";\n}\n",
        )
        .unwrap();
        assert_eq!(resolve_target(dir.path()).unwrap().as_str(), "nixbox");
    }

    #[test]
    fn test_resolve_target_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = resolve_target(dir.path()).unwrap_err();
        assert!(matches!(err, BootstrapError::TargetRead { .. }));
    }

    #[test]
    fn test_target_identifier_rejects_blank() {
        assert!(TargetIdentifier::new("").is_none());
        assert!(TargetIdentifier::new(" ").is_none());
        assert_eq!(TargetIdentifier::new("nixbox").unwrap().to_string(), "nixbox");
    }
}
