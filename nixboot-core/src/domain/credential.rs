//! Deploy credential domain type
//!
//! The deploy credential is an SSH keypair identified by the path of its
//! private half; the public half sits next to it with a `.pub` suffix.

use std::io;
use std::path::{Path, PathBuf};

/// Key algorithm used for the deploy key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyAlgorithm {
    #[default]
    Ed25519,
}

impl KeyAlgorithm {
    /// Name understood by `ssh-keygen -t`
    pub fn as_str(self) -> &'static str {
        match self {
            KeyAlgorithm::Ed25519 => "ed25519",
        }
    }
}

impl std::fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// SSH keypair reserved for read-only access to the configuration repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployCredential {
    private_key: PathBuf,
    algorithm: KeyAlgorithm,
}

impl DeployCredential {
    /// Creates a credential handle for the given private key path
    ///
    /// Nothing is touched on disk.
    pub fn new(private_key: impl Into<PathBuf>) -> Self {
        Self {
            private_key: private_key.into(),
            algorithm: KeyAlgorithm::default(),
        }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn private_key(&self) -> &Path {
        &self.private_key
    }

    /// Path of the public half (`<private>.pub`)
    pub fn public_key(&self) -> PathBuf {
        let mut path = self.private_key.clone().into_os_string();
        path.push(".pub");
        PathBuf::from(path)
    }

    /// Whether a usable keypair is already on disk
    ///
    /// Both halves have to be present; a lone private key without its
    /// public half cannot be shown to the operator for registration.
    pub fn exists(&self) -> bool {
        self.private_key.is_file() && self.public_key().is_file()
    }

    /// Whether either half is present on disk
    pub fn any_half_exists(&self) -> bool {
        self.private_key.exists() || self.public_key().exists()
    }

    /// Reads the public half, trimmed of trailing whitespace
    pub fn read_public_key(&self) -> io::Result<String> {
        let content = std::fs::read_to_string(self.public_key())?;
        Ok(content.trim_end().to_string())
    }

    /// Deletes both halves, ignoring halves that are already gone
    pub fn remove(&self) -> io::Result<()> {
        for path in [self.private_key.clone(), self.public_key()] {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
