//! Git operations
//!
//! Only cloning is needed: local working copies for `localdev` services.

use crate::error::ToolError;
use crate::tools::tools::GIT;

use super::runner::ToolRunner;

/// Client for git operations
pub struct GitClient<'a, R: ToolRunner> {
    runner: &'a R,
}

impl<'a, R: ToolRunner> GitClient<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// `git clone <repository> <path>`
    pub async fn clone_into(&self, repository: &str, path: &str) -> Result<String, ToolError> {
        self.runner
            .run(
                GIT,
                &["clone".to_string(), repository.to_string(), path.to_string()],
            )
            .await
    }
}
