//! Chart repository and container registry credentials.

use serde::{Deserialize, Serialize};

/// A Helm chart repository to register before resolving dependencies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelmRepoDecl {
    /// Local repository name (e.g., "stable")
    pub name: String,

    /// Repository URL
    pub url: String,

    /// Ask for basic auth credentials when username/password resolve empty
    #[serde(default)]
    pub promptbasicauth: bool,

    /// Basic auth username (supports `${VAR}` interpolation)
    #[serde(default)]
    pub username: String,

    /// Basic auth password (supports `${VAR}` interpolation)
    #[serde(default)]
    pub password: String,
}

/// Credentials used to provision the image pull secret
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DockerCredentials {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl DockerCredentials {
    /// True when every field still has to be collected from the terminal
    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.password.is_empty() && self.email.is_empty()
    }
}
