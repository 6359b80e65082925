//! Repository reference domain type
//!
//! A reference names one private repository on a git hosting platform and
//! can be rendered as an SSH transport URL or as a web URL.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Path appended to the repository web URL to reach the "add deploy key" page
pub const DEPLOY_KEY_SETTINGS_PATH: &str = "/settings/keys/new";

static SCP_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^git@(?P<host>[^:/\s]+):(?P<owner>[^/\s]+)/(?P<name>[^/\s]+?)(?:\.git)?$")
        .expect("scp reference pattern")
});

static URL_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ssh://git@(?P<host>[^:/\s]+)/(?P<owner>[^/\s]+)/(?P<name>[^/\s]+?)(?:\.git)?$")
        .expect("ssh url reference pattern")
});

static SHORT_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<owner>[^/\s:@]+)/(?P<name>[^/\s]+?)(?:\.git)?$")
        .expect("short reference pattern")
});

/// Account names on the default platform, used for the short form
static OWNER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]{0,38}$").expect("owner pattern"));

/// Owners behind an explicit host, where groups like `my_group` are common
static HOSTED_OWNER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9._-]{0,254}$").expect("hosted owner pattern")
});

static NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]{1,100}$").expect("name pattern"));

static HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?)*$")
        .expect("host pattern")
});

/// Reasons a repository reference is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("repository reference is empty")]
    Empty,

    #[error("`{0}` is not of the form owner/name, git@host:owner/name.git or ssh://git@host/owner/name.git")]
    Unrecognized(String),

    #[error("`{0}` is not a valid owner name")]
    InvalidOwner(String),

    #[error("`{0}` is not a valid repository name")]
    InvalidName(String),

    #[error("`{0}` is not a valid host name")]
    InvalidHost(String),
}

/// Checks that `host` is a bare DNS-style host name (no scheme, port or path)
pub fn is_valid_host(host: &str) -> bool {
    HOST.is_match(host)
}

/// Handle to a private repository, always expressible as a transport URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReference {
    host: String,
    owner: String,
    name: String,
}

impl RepositoryReference {
    /// Parse operator input into a reference
    ///
    /// Short `owner/name` input is expanded against `default_host`; the
    /// transport forms carry their own host.
    ///
    /// # Arguments
    /// * `input` - Raw operator input, surrounding whitespace is ignored
    /// * `default_host` - Hosting platform for the short form (e.g. "github.com")
    pub fn parse(input: &str, default_host: &str) -> Result<Self, ReferenceError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ReferenceError::Empty);
        }

        let (host, owner_pattern, captures) = if let Some(caps) = SCP_FORM.captures(input) {
            (caps["host"].to_string(), &HOSTED_OWNER, caps)
        } else if let Some(caps) = URL_FORM.captures(input) {
            (caps["host"].to_string(), &HOSTED_OWNER, caps)
        } else if let Some(caps) = SHORT_FORM.captures(input) {
            (default_host.to_string(), &OWNER, caps)
        } else {
            return Err(ReferenceError::Unrecognized(input.to_string()));
        };

        let owner = &captures["owner"];
        let name = &captures["name"];

        if !is_valid_host(&host) {
            return Err(ReferenceError::InvalidHost(host));
        }
        if !owner_pattern.is_match(owner) || owner.ends_with('.') {
            return Err(ReferenceError::InvalidOwner(owner.to_string()));
        }
        if !NAME.is_match(name) || name == "." || name == ".." {
            return Err(ReferenceError::InvalidName(name.to_string()));
        }

        Ok(Self {
            host,
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `owner/name`
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Prefix shared by every SSH transport URL on this host
    fn transport_prefix(&self) -> String {
        format!("git@{}:", self.host)
    }

    /// SSH transport URL, e.g. `git@github.com:alice/homelab.git`
    pub fn transport_url(&self) -> String {
        format!("{}{}.git", self.transport_prefix(), self.slug())
    }

    /// Web URL derived from the transport URL by swapping the transport
    /// prefix for an https prefix and dropping the `.git` suffix
    pub fn web_url(&self) -> String {
        let transport = self.transport_url();
        let web = transport.replacen(
            &self.transport_prefix(),
            &format!("https://{}/", self.host),
            1,
        );
        match web.strip_suffix(".git") {
            Some(stripped) => stripped.to_string(),
            None => web,
        }
    }

    /// Direct link to the page where a deploy key is registered
    pub fn deploy_key_settings_url(&self) -> String {
        format!("{}{}", self.web_url(), DEPLOY_KEY_SETTINGS_PATH)
    }
}

impl std::fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.transport_url())
    }
}
