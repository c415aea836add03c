//! Container builds for local services

use crate::error::ToolError;
use crate::tools::tools::DOCKER;

use super::runner::ToolRunner;

pub struct DockerClient<'a, R: ToolRunner> {
    runner: &'a R,
}

impl<'a, R: ToolRunner> DockerClient<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Run `docker` with a `container-build` string split on whitespace
    pub async fn build(&self, container_build: &str) -> Result<String, ToolError> {
        self.runner.run(DOCKER, &build_args(container_build)).await
    }
}

pub fn build_args(container_build: &str) -> Vec<String> {
    container_build
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::runner::fake::RecordingRunner;

    #[test]
    fn test_build_args_collapse_whitespace() {
        assert_eq!(
            build_args("build  -t api:v7\t."),
            vec!["build", "-t", "api:v7", "."]
        );
    }

    #[tokio::test]
    async fn test_build_invokes_docker() {
        let runner = RecordingRunner::new();
        DockerClient::new(&runner)
            .build("build -t api:dev ./api")
            .await
            .unwrap();
        assert_eq!(runner.calls(), vec!["docker build -t api:dev ./api"]);
    }
}
