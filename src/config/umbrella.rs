//! Umbrella chart declaration and its release environments.

use serde::{Deserialize, Serialize};

/// The top-level chart that aggregates every service chart as a dependency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UmbrellaDecl {
    /// Chart name
    #[serde(default)]
    pub name: String,

    /// Chart repository, optionally prefixed with `@` (e.g., "@stable")
    #[serde(default)]
    pub repository: String,

    /// Local path to the umbrella chart directory
    #[serde(default)]
    pub path: String,

    /// Named release-time overlays, in declaration order
    #[serde(default)]
    pub environments: Vec<EnvironmentDecl>,
}

/// A named overlay of value files, `--set` values and extra helm flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentDecl {
    pub name: String,

    /// Value files relative to the umbrella path
    #[serde(default)]
    pub files: Vec<String>,

    /// `key=value` overrides (supports `${VAR}` interpolation)
    #[serde(default)]
    pub values: Vec<String>,

    /// Extra flags appended verbatim to `helm upgrade`
    #[serde(default)]
    pub flags: Vec<String>,
}
