//! Pipeline stage labels

/// The stages of the bootstrap pipeline, in their documented order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    Credential,
    Registration,
    Connectivity,
    Fetch,
    Persist,
    Target,
    Pivot,
}

impl Stage {
    /// Total number of stages, used for `[n/N]` headers
    pub const COUNT: usize = 8;

    /// One-based position of the stage in the documented order
    pub fn number(self) -> usize {
        match self {
            Stage::Input => 1,
            Stage::Credential => 2,
            Stage::Registration => 3,
            Stage::Connectivity => 4,
            Stage::Fetch => 5,
            Stage::Persist => 6,
            Stage::Target => 7,
            Stage::Pivot => 8,
        }
    }

    /// Human readable stage title
    pub fn title(self) -> &'static str {
        match self {
            Stage::Input => "Repository",
            Stage::Credential => "Deploy key",
            Stage::Registration => "Registration",
            Stage::Connectivity => "Connectivity",
            Stage::Fetch => "Fetch configuration",
            Stage::Persist => "Persist secret",
            Stage::Target => "Resolve target",
            Stage::Pivot => "Install system",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}
