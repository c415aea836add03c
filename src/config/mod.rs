//! # Umbrella Configuration
//!
//! Loads the declarative `canopy.yaml` that describes an umbrella release.
//!
//! ## Layout
//!
//! 1. **Top level**: helm generation, image pull secret and docker credentials,
//!    chart repositories to register.
//! 2. **Umbrella** ([`UmbrellaDecl`]): the aggregate chart and its named
//!    release environments.
//! 3. **Services** ([`ServiceDecl`]): each dependency chart with its named
//!    states (e.g. `default`, `local`).
//!
//! The file is read once per invocation and never mutated. Everything here is
//! as-declared: interpolation and state selection happen in [`crate::domain`].
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let raw = RawConfig::load(None)?;
//! println!("Umbrella: {}", raw.umbrella.name);
//! ```

mod overrides;
mod registry;
mod service;
mod umbrella;

pub use overrides::{parse_env_pairs, StateOverrides, VersionOverrides};
pub use registry::{DockerCredentials, HelmRepoDecl};
pub use service::{ServiceDecl, LOCALDEV};
#[cfg(test)]
pub use service::{AllStatesDefaults, StateDecl, StepDecl};
pub use umbrella::{EnvironmentDecl, UmbrellaDecl};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;

/// File names searched in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["canopy.yaml", "canopy.yml"];

/// The as-declared configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawConfig {
    /// Helm major version; 0 (unset) selects the legacy generation
    #[serde(default, rename = "helmVersion")]
    pub helm_version: u32,

    /// Name of the docker-registry secret to ensure in the namespace
    #[serde(default, rename = "pull-secrets-name")]
    pub pull_secrets_name: String,

    #[serde(default)]
    pub docker_username: String,

    #[serde(default)]
    pub docker_password: String,

    #[serde(default)]
    pub docker_email: String,

    #[serde(default, rename = "helm-repos")]
    pub helm_repos: Vec<HelmRepoDecl>,

    #[serde(default)]
    pub umbrella: UmbrellaDecl,

    #[serde(default)]
    pub services: Vec<ServiceDecl>,
}

impl RawConfig {
    /// Load from an explicit path, or discover `canopy.yaml` in the working directory
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::discover(Path::new("."))?,
        };
        Self::load_from(&path)
    }

    /// Read and parse a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_yaml(&content).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse a YAML document
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Find the first default config file in `dir`
    pub fn discover(dir: &Path) -> Result<PathBuf, ConfigError> {
        DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.exists())
            .ok_or_else(|| ConfigError::FileNotFound {
                path: dir.join(DEFAULT_CONFIG_FILES[0]).display().to_string(),
            })
    }
}
