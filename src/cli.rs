//! CLI definitions for canopy
//!
//! This module contains all CLI argument parsing structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::upgrade::DEFAULT_TILLER_NAMESPACE;

#[derive(Parser)]
#[command(
    name = "canopy",
    version,
    about = "Umbrella chart preprocessor and deployment orchestrator for Helm",
    long_about = "Resolves per-service states from canopy.yaml, writes the umbrella's \
                  dependency list and runs 'helm upgrade --install' with the matching values."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (defaults to ./canopy.yaml or ./canopy.yml)
    #[arg(short, long, global = true, env = "CANOPY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Set a service's state, e.g. my-service=local (repeatable)
    #[arg(short = 's', long, global = true, value_delimiter = ',')]
    pub service_state: Vec<String>,

    /// Umbrella environment to deploy
    #[arg(short, long, global = true, default_value = "default")]
    pub environment: String,

    /// Override a service's chart version, e.g. my-service=1.0.0 (repeatable)
    #[arg(short = 'o', long, global = true, value_delimiter = ',')]
    pub state_v_override: Vec<String>,

    /// Put every service into the same state
    #[arg(short = 'a', long, global = true)]
    pub set_state_all: Option<String>,

    /// Extra variable for interpolation, e.g. TAG=v7; wins over the process environment
    #[arg(short = 'E', long, global = true)]
    pub extra_env: Vec<String>,

    /// Run every step except the helm upgrade and print the command instead
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Use the helm-secrets plugin
    #[arg(long, global = true)]
    pub helm_secrets: bool,

    /// Skip container builds and the pre/post deploy steps
    #[arg(short = 'k', long, global = true)]
    pub skip_docker: bool,

    /// Pass --debug to helm and echo commands unredacted. Prints secrets!
    #[arg(long, global = true)]
    pub supersecret: bool,
}

/// Options shaping the `helm upgrade` invocation
#[derive(Args, Debug, Clone)]
pub struct UpgradeArgs {
    /// Helm release name
    #[arg(long)]
    pub release: String,

    /// Kubernetes namespace of the release
    #[arg(long)]
    pub namespace: Option<String>,

    /// Namespace where Tiller runs (legacy helm only)
    #[arg(long, default_value = DEFAULT_TILLER_NAMESPACE)]
    pub tiller_namespace: String,

    /// Talk to Tiller over TLS (legacy helm only)
    #[arg(long)]
    pub tls: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write dependencies and run 'helm upgrade --install'
    Up {
        #[command(flatten)]
        upgrade: UpgradeArgs,

        /// Skip 'helm dependency update'
        #[arg(long)]
        fast: bool,
    },

    /// Only write the dependency list and download dependencies
    RequirementsBuild {
        /// Write the dependency list without downloading anything
        #[arg(long)]
        fast: bool,
    },

    /// Fetch the umbrella chart from its repository
    Fetch {
        /// Chart version to fetch (latest when omitted)
        #[arg(long = "chart-version")]
        version: Option<String>,

        /// Directory to untar into
        #[arg(short = 'D', long, default_value = ".")]
        destination: String,
    },

    /// Print the dependency list and upgrade command without running anything
    Render {
        #[command(flatten)]
        upgrade: UpgradeArgs,
    },
}
