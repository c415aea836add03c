//! `canopy render`: print what `up` would write and run, touching nothing

use anyhow::{Context, Result};

use super::working_dir;
use crate::cli::{GlobalArgs, UpgradeArgs};
use crate::domain::upgrade::{render_command, synthesize};
use crate::domain::{Manifest, ProcessEnv, ResolvedModel};
use crate::tools::tools::HELM;
use crate::ui;

pub fn execute(global: &GlobalArgs, upgrade: UpgradeArgs) -> Result<()> {
    let raw = global.load_config()?;
    let wd = working_dir()?;
    let options = global.upgrade_options(Some(&upgrade), wd.clone());

    let model = ResolvedModel::build(&raw, &global.resolve_options()?, &ProcessEnv, &wd);
    for diagnostic in &model.diagnostics {
        ui::print_warning(&diagnostic.to_string());
    }

    let manifest = Manifest::build(&model, &global.version_overrides(), &wd);
    let yaml = manifest
        .to_yaml()
        .context("Failed to render the dependency list")?;

    println!("# dependencies for {}", model.umbrella.path.display());
    println!("{}", yaml.trim_end());
    println!();
    println!("{}", render_command(HELM, &synthesize(&model, &options)));
    Ok(())
}
