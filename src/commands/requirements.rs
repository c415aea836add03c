//! `canopy requirements-build`: write the dependency list and fetch dependencies

use anyhow::Result;

use super::working_dir;
use crate::cli::GlobalArgs;
use crate::domain::{PipelineFlags, ProcessEnv};
use crate::infrastructure::{ProcessRunner, TerminalPrompter};
use crate::services::{DeployConfig, DeployService};

/// With `fast`, only the dependency list is written and no tool is invoked
pub async fn execute(global: &GlobalArgs, fast: bool) -> Result<()> {
    let raw = global.load_config()?;

    let config = DeployConfig {
        raw: &raw,
        resolve: global.resolve_options()?,
        versions: global.version_overrides(),
        upgrade: global.upgrade_options(None, working_dir()?),
        flags: PipelineFlags {
            requirements_only: true,
            offline: fast,
            ..Default::default()
        },
    };

    let runner = ProcessRunner::new(global.supersecret).with_progress(true);
    let prompter = TerminalPrompter;
    let env = ProcessEnv;

    DeployService::new(&runner, &prompter, &env)
        .execute(&config)
        .await?;

    Ok(())
}
