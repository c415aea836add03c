//! Subcommand handlers
//!
//! Each handler turns parsed CLI arguments into domain options and hands them
//! to the deploy service or an infrastructure client.

pub mod fetch;
pub mod render;
pub mod requirements;
pub mod up;

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::cli::{GlobalArgs, UpgradeArgs};
use crate::config::{parse_env_pairs, RawConfig, StateOverrides, VersionOverrides};
use crate::domain::{ResolveOptions, StateSelection, UpgradeOptions};
use crate::error::CanopyError;

impl GlobalArgs {
    /// Load `canopy.yaml` from `--config` or the working directory
    pub fn load_config(&self) -> Result<RawConfig, CanopyError> {
        Ok(RawConfig::load(self.config.as_deref())?)
    }

    /// Environment, state selection and interpolation overrides
    pub fn resolve_options(&self) -> Result<ResolveOptions, CanopyError> {
        Ok(ResolveOptions {
            environment: self.environment.clone(),
            selection: StateSelection {
                force_all: self.set_state_all.clone(),
                per_service: StateOverrides::parse(&self.service_state),
            },
            extra_env: parse_env_pairs("extra-env", &self.extra_env)?,
        })
    }

    pub fn version_overrides(&self) -> VersionOverrides {
        VersionOverrides::new(self.state_v_override.iter().cloned())
    }

    /// Upgrade settings; `upgrade` is absent for commands that never deploy
    pub fn upgrade_options(
        &self,
        upgrade: Option<&UpgradeArgs>,
        working_dir: PathBuf,
    ) -> UpgradeOptions {
        let mut options = UpgradeOptions {
            use_secrets: self.helm_secrets,
            reveal_all: self.supersecret,
            working_dir,
            timestamp: chrono::Utc::now().timestamp(),
            ..Default::default()
        };
        if let Some(args) = upgrade {
            options.release = Some(args.release.clone());
            options.namespace = args.namespace.clone();
            options.tiller_namespace = args.tiller_namespace.clone();
            options.tls = args.tls;
        }
        options
    }
}

/// Directory the run was started from
pub fn working_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to determine the working directory")
}
