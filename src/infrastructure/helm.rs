//! Helm adapter
//!
//! Builds argument lists for the helm subcommands the pipeline uses and runs
//! them through a [`ToolRunner`].

use std::path::Path;
use url::Url;

use crate::error::{CredentialError, ToolError};
use crate::tools::tools::HELM;

use super::runner::ToolRunner;

/// Helm's complaint when `helm repo list` has nothing to list
pub const NO_REPOSITORIES: &str = "no repositories to show";

pub struct HelmClient<'a, R: ToolRunner> {
    runner: &'a R,
}

impl<'a, R: ToolRunner> HelmClient<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Output of `helm repo list`; an empty repository list is not an error
    pub async fn repo_list(&self) -> Result<String, ToolError> {
        match self.runner.run(HELM, &strings(&["repo", "list"])).await {
            Ok(output) => Ok(output),
            Err(e) if e.output().contains(NO_REPOSITORIES) => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    pub async fn repo_add(&self, name: &str, url: &str) -> Result<String, ToolError> {
        self.runner
            .run(HELM, &strings(&["repo", "add", name, url]))
            .await
    }

    pub async fn dependency_update(&self, chart: &Path) -> Result<String, ToolError> {
        let chart = chart.display().to_string();
        self.runner
            .run(HELM, &strings(&["dependency", "update", &chart]))
            .await
    }

    /// Run a synthesized upgrade argument list
    pub async fn upgrade(&self, args: &[String]) -> Result<String, ToolError> {
        self.runner.run(HELM, args).await
    }

    pub async fn fetch(
        &self,
        repository: &str,
        chart: &str,
        version: Option<&str>,
        destination: &str,
    ) -> Result<String, ToolError> {
        self.runner
            .run(HELM, &fetch_args(repository, chart, version, destination))
            .await
    }
}

/// Arguments for `helm fetch <repo>/<chart> --untar [--version=v] -d <dir>`
pub fn fetch_args(
    repository: &str,
    chart: &str,
    version: Option<&str>,
    destination: &str,
) -> Vec<String> {
    let repository = repository.strip_prefix('@').unwrap_or(repository);
    let mut args = vec![
        "fetch".to_string(),
        format!("{}/{}", repository, chart),
        "--untar".to_string(),
    ];
    if let Some(version) = version.filter(|v| !v.is_empty()) {
        args.push(format!("--version={}", version));
    }
    args.push("-d".to_string());
    args.push(destination.to_string());
    args
}

/// True when `listing` (output of `helm repo list`) mentions `name`
pub fn is_listed(listing: &str, name: &str) -> bool {
    listing.contains(name)
}

/// Validate a repository URL and optionally embed basic-auth userinfo
pub fn repository_url(
    url: &str,
    credentials: Option<(&str, &str)>,
) -> Result<String, CredentialError> {
    let invalid = |message: String| CredentialError::InvalidUrl {
        url: url.to_string(),
        message,
    };

    let mut parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;

    let Some((username, password)) = credentials else {
        return Ok(url.to_string());
    };

    parsed
        .set_username(username)
        .map_err(|_| invalid("URL cannot carry a username".to_string()))?;
    parsed
        .set_password(Some(password))
        .map_err(|_| invalid("URL cannot carry a password".to_string()))?;

    Ok(parsed.to_string())
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}
