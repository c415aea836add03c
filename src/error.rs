//! Centralized error types for canopy
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use thiserror::Error;

/// Top-level error type for canopy operations
#[derive(Error, Debug)]
pub enum CanopyError {
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Environment and state lookup failures.
///
/// These never abort resolution: the offending service is dropped, or the
/// umbrella resolves without an environment overlay.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("A service or state requested was not found for {service} {state}")]
    StateNotFound { service: String, state: String },

    #[error("The specified environment was not found: {name}")]
    EnvironmentNotFound { name: String },
}

/// External tool failures
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to start {tool}: {message}")]
    SpawnFailed { tool: String, message: String },

    #[error("{tool} exited with status {code:?} running `{command}`:\n{output}")]
    Failed {
        tool: String,
        command: String,
        code: Option<i32>,
        output: String,
    },
}

impl ToolError {
    /// Combined stdout/stderr of the failed invocation, if it ran at all
    pub fn output(&self) -> &str {
        match self {
            Self::SpawnFailed { .. } => "",
            Self::Failed { output, .. } => output,
        }
    }
}

/// Credential collection errors
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Invalid repository URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Failed to read {field} from terminal: {message}")]
    PromptFailed { field: String, message: String },
}

/// Chart metadata read/write errors
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read chart metadata at {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("Failed to parse chart metadata at {path}: {message}")]
    ParseFailed { path: String, message: String },

    #[error("Invalid chart apiVersion '{api_version}' in {path}. Expected v1 or v2")]
    UnknownApiVersion { path: String, api_version: String },

    #[error("Failed to write {path}: {message}")]
    WriteFailed { path: String, message: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse config {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Invalid value for {field}: {value}. Expected KEY=VALUE")]
    InvalidPair { field: String, value: String },
}
