//! Preset file loading.
//!
//! `reposmith.toml` carries per-user defaults so repeated runs do not need
//! the same flags every time. Command-line flags always win over presets.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use scm::models::OwnerKind;

/// Presets loaded from `reposmith.toml`. Every field is optional.
///
/// ```toml
/// owner = "acme"
/// owner_kind = "organization"
/// branch = "main"
/// required_checks = ["ci/lint", "ci/test"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Presets {
    /// Default repository owner.
    pub owner: Option<String>,
    /// Whether the owner is a `user` or an `organization`.
    pub owner_kind: Option<OwnerKind>,
    /// Branch the protection rules apply to.
    pub branch: Option<String>,
    /// Required status check contexts.
    #[serde(default)]
    pub required_checks: Vec<String>,
    /// Extra `.gitignore` patterns.
    #[serde(default)]
    pub gitignore_extra: Vec<String>,
}

impl Presets {
    /// Load presets from `explicit` if given, otherwise from the first
    /// default location that exists, otherwise empty presets.
    ///
    /// An explicit path that cannot be read is an error; absent default
    /// locations are not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::read(path);
        }

        for path in Self::default_locations() {
            if path.exists() {
                return Self::read(&path);
            }
        }

        Ok(Self::default())
    }

    fn read(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading presets");
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// `./reposmith.toml`, then the user config directory.
    fn default_locations() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("reposmith.toml")];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("reposmith").join("reposmith.toml"));
        }
        paths
    }
}
