//! Domain layer - pure business logic
//!
//! This module contains business logic with no external I/O.
//! Types and functions here can be unit tested without mocking.

pub mod environment;
pub mod interpolate;
pub mod manifest;
pub mod model;
pub mod pipeline;
pub mod state;
pub mod upgrade;

// Re-export commonly used types
pub use interpolate::ProcessEnv;
pub use manifest::Manifest;
pub use model::{ResolveOptions, ResolvedModel};
pub use pipeline::{DeployReport, PipelineFlags, Stage, StageResult};
pub use state::StateSelection;
pub use upgrade::UpgradeOptions;
