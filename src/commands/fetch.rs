//! `canopy fetch`: download and untar the umbrella chart itself

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::GlobalArgs;
use crate::infrastructure::{HelmClient, ProcessRunner};
use crate::ui;

pub async fn execute(global: &GlobalArgs, version: Option<String>, destination: String) -> Result<()> {
    let raw = global.load_config()?;
    let umbrella = &raw.umbrella;

    if umbrella.repository.is_empty() {
        anyhow::bail!(
            "Umbrella {} has no repository to fetch from. Set umbrella.repository in the config",
            umbrella.name
        );
    }

    info!("📦 Fetching the umbrella...");
    info!("   Chart: {}/{}", umbrella.repository, umbrella.name);
    if let Some(v) = version.as_deref() {
        info!("   Version: {}", v);
    }

    let runner = ProcessRunner::new(global.supersecret).with_progress(true);
    HelmClient::new(&runner)
        .fetch(
            &umbrella.repository,
            &umbrella.name,
            version.as_deref(),
            &destination,
        )
        .await
        .context("error with umbrella fetch")?;

    ui::print_success(&format!("Fetched {} into {}", umbrella.name, destination));
    Ok(())
}
