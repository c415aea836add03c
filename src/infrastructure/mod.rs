//! Infrastructure layer - external I/O adapters
//!
//! This module contains all code that interacts with external systems:
//! - helm, kubectl, git and docker via [`runner::ToolRunner`]
//! - Chart metadata files on disk
//! - The operator's terminal for credentials

pub mod chart_file;
pub mod docker;
pub mod git;
pub mod helm;
pub mod kube;
pub mod prompt;
pub mod runner;

// Re-export commonly used types
pub use docker::DockerClient;
pub use git::GitClient;
pub use helm::HelmClient;
pub use kube::KubeClient;
pub use prompt::{Prompter, TerminalPrompter};
pub use runner::{ProcessRunner, ToolRunner};
