//! Runtime tool path resolution
//!
//! For each external tool (e.g. `helm`) we:
//! 1. Check for an environment variable `{TOOL}_BIN` (e.g. `HELM_BIN`)
//! 2. Look the tool up on `PATH` with `which`
//! 3. Fall back to the bare name and let the spawn fail with a clear error
//!
//! Setting `{TOOL}_BIN` pins an exact binary, which is also how tests and
//! wrappers substitute a tool.

use std::env;
use tracing::debug;

/// Get the path to an external tool
///
/// ```rust,ignore
/// // With HELM_BIN="/opt/helm-3.14/bin/helm"
/// assert_eq!(get_tool_path("helm"), "/opt/helm-3.14/bin/helm");
/// ```
pub fn get_tool_path(tool: &str) -> String {
    let env_var = format!("{}_BIN", tool.to_uppercase());
    if let Some(path) = env::var(&env_var).ok().filter(|p| !p.is_empty()) {
        return path;
    }

    match which::which(tool) {
        Ok(path) => path.display().to_string(),
        Err(e) => {
            debug!("{} not found on PATH ({}), using bare name", tool, e);
            tool.to_string()
        }
    }
}

/// Tool names the deploy pipeline shells out to
pub mod tools {
    pub const HELM: &str = "helm";
    pub const KUBECTL: &str = "kubectl";
    pub const GIT: &str = "git";
    pub const DOCKER: &str = "docker";
}
