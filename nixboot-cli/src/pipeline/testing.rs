//! In-memory collaborators for pipeline tests

use anyhow::Result;
use async_trait::async_trait;
use nixboot_core::{DeployCredential, HOST_CONFIG_FILE, RepositoryReference, TargetIdentifier};
use std::collections::VecDeque;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::privilege::Elevation;
use crate::service::{
    BuildOutcome, GitTransport, KeyGenerator, Notice, Operator, PrivilegedFs, ProbeOutcome,
    SystemBuilder,
};

/// Operator answering prompts from a fixed script; input closes when the
/// script runs out
pub struct ScriptedOperator {
    answers: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    notices: Mutex<Vec<Notice>>,
}

impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|notice| match notice {
                Notice::Warning(text) => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Operator for ScriptedOperator {
    async fn read_line(&self, prompt: &str) -> Result<Option<String>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.answers.lock().unwrap().pop_front())
    }

    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Key generator writing placeholder key material
pub struct FakeKeygen {
    failure: Option<String>,
    generated: AtomicU32,
    derived: AtomicU32,
}

impl FakeKeygen {
    pub fn new() -> Self {
        Self {
            failure: None,
            generated: AtomicU32::new(0),
            derived: AtomicU32::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn generated(&self) -> u32 {
        self.generated.load(Ordering::SeqCst)
    }

    pub fn derived(&self) -> u32 {
        self.derived.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyGenerator for FakeKeygen {
    async fn generate(&self, credential: &DeployCredential, label: &str) -> Result<()> {
        if let Some(message) = &self.failure {
            anyhow::bail!("{}", message);
        }
        self.generated.fetch_add(1, Ordering::SeqCst);

        if let Some(parent) = credential.private_key().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serial = self.generated();
        std::fs::write(credential.private_key(), format!("PRIVATE-{}", serial))?;
        std::fs::write(
            credential.public_key(),
            format!("ssh-ed25519 AAAAfake{} {}\n", serial, label),
        )?;
        Ok(())
    }

    async fn derive_public(&self, credential: &DeployCredential) -> Result<()> {
        if let Some(message) = &self.failure {
            anyhow::bail!("{}", message);
        }
        self.derived.fetch_add(1, Ordering::SeqCst);
        std::fs::write(credential.public_key(), "ssh-ed25519 AAAAderived\n")?;
        Ok(())
    }
}

/// Git transport with scripted probe results and a synthetic clone
pub struct FakeGit {
    probes: Mutex<VecDeque<ProbeOutcome>>,
    host_config: Option<String>,
    broken_probe: Option<String>,
    fail_clone: bool,
    probe_calls: AtomicU32,
    clone_calls: AtomicU32,
}

impl FakeGit {
    /// Probes answer from `probes`, then `Reachable` once it is exhausted.
    /// A clone writes `host_config` as the host configuration file when set.
    pub fn new(probes: Vec<ProbeOutcome>, host_config: Option<&str>) -> Self {
        Self {
            probes: Mutex::new(probes.into()),
            host_config: host_config.map(str::to_string),
            broken_probe: None,
            fail_clone: false,
            probe_calls: AtomicU32::new(0),
            clone_calls: AtomicU32::new(0),
        }
    }

    pub fn with_broken_probe(mut self, message: &str) -> Self {
        self.broken_probe = Some(message.to_string());
        self
    }

    pub fn with_failing_clone(mut self) -> Self {
        self.fail_clone = true;
        self
    }

    pub fn probe_calls(&self) -> u32 {
        self.probe_calls.load(Ordering::SeqCst)
    }

    pub fn clone_calls(&self) -> u32 {
        self.clone_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GitTransport for FakeGit {
    async fn probe(
        &self,
        _repository: &RepositoryReference,
        _credential: &DeployCredential,
    ) -> Result<ProbeOutcome> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.broken_probe {
            anyhow::bail!("{}", message);
        }
        Ok(self
            .probes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ProbeOutcome::Reachable))
    }

    async fn clone_into(
        &self,
        repository: &RepositoryReference,
        _credential: &DeployCredential,
        destination: &Path,
    ) -> Result<()> {
        self.clone_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_clone {
            anyhow::bail!("Repository not found: {}", repository);
        }
        if destination.exists() {
            anyhow::bail!("destination path '{}' already exists", destination.display());
        }

        std::fs::create_dir_all(destination)?;
        std::fs::write(destination.join("flake.nix"), "{ }\n")?;
        if let Some(content) = &self.host_config {
            std::fs::write(destination.join(HOST_CONFIG_FILE), content)?;
        }
        Ok(())
    }
}

/// Filesystem service doing the work in-process and recording each call
pub struct FakeFs {
    calls: Mutex<Vec<String>>,
}

impl FakeFs {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PrivilegedFs for FakeFs {
    async fn remove_all(&self, _elevation: &Elevation, path: &Path) -> Result<()> {
        self.record(format!("remove_all {}", path.display()));
        match std::fs::remove_dir_all(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    async fn create_dir_all(&self, _elevation: &Elevation, dir: &Path) -> Result<()> {
        self.record(format!("create_dir_all {}", dir.display()));
        std::fs::create_dir_all(dir)?;
        Ok(())
    }

    async fn install_secret(
        &self,
        _elevation: &Elevation,
        source: &Path,
        destination: &Path,
    ) -> Result<()> {
        self.record(format!(
            "install_secret {} {}",
            source.display(),
            destination.display()
        ));
        std::fs::copy(source, destination)?;
        std::fs::set_permissions(destination, std::fs::Permissions::from_mode(0o600))?;
        Ok(())
    }
}

/// Builder returning a fixed outcome and recording the flake references
pub struct FakeBuilder {
    outcome: BuildOutcome,
    calls: Mutex<Vec<String>>,
}

impl FakeBuilder {
    pub fn new(outcome: BuildOutcome) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SystemBuilder for FakeBuilder {
    async fn build(
        &self,
        _elevation: &Elevation,
        source: &Path,
        target: &TargetIdentifier,
    ) -> Result<BuildOutcome> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}#{}", source.display(), target));
        Ok(self.outcome.clone())
    }
}
