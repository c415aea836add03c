//! `canopy up`: write dependencies and run `helm upgrade --install`

use anyhow::Result;
use tracing::info;

use super::working_dir;
use crate::cli::{GlobalArgs, UpgradeArgs};
use crate::domain::{PipelineFlags, ProcessEnv};
use crate::infrastructure::{ProcessRunner, TerminalPrompter};
use crate::services::{DeployConfig, DeployService};

pub async fn execute(global: &GlobalArgs, upgrade: UpgradeArgs, fast: bool) -> Result<()> {
    let raw = global.load_config()?;

    let config = DeployConfig {
        raw: &raw,
        resolve: global.resolve_options()?,
        versions: global.version_overrides(),
        upgrade: global.upgrade_options(Some(&upgrade), working_dir()?),
        flags: PipelineFlags {
            skip_build: global.skip_docker,
            skip_dependency_update: fast,
            dry_run: global.dry_run,
            ..Default::default()
        },
    };

    let runner = ProcessRunner::new(global.supersecret).with_progress(true);
    let prompter = TerminalPrompter;
    let env = ProcessEnv;

    let report = DeployService::new(&runner, &prompter, &env)
        .execute(&config)
        .await?;

    if global.dry_run {
        if let Some(command) = report.upgrade_output {
            info!("Dry run, the following command would have been executed:");
            println!("{}", command);
        }
    }

    Ok(())
}
