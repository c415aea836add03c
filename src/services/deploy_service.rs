//! Deploy service - orchestrates the umbrella deployment workflow
//!
//! Walks the [`Stage`] machine from resolution to post-deploy exec. Each
//! stage runs to completion before the next starts; the first failure stops
//! the run and is returned as-is. Nothing is retried or rolled back.

use anyhow::{Context, Result};
use colored::Colorize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::{RawConfig, VersionOverrides};
use crate::domain::interpolate::EnvLookup;
use crate::domain::upgrade;
use crate::domain::{
    DeployReport, Manifest, PipelineFlags, ResolveOptions, ResolvedModel, Stage, StageResult,
    UpgradeOptions,
};
use crate::infrastructure::chart_file;
use crate::infrastructure::helm::{self, HelmClient};
use crate::infrastructure::prompt::{value_or_prompt, Secrecy};
use crate::infrastructure::{DockerClient, GitClient, KubeClient, Prompter, ToolRunner};
use crate::tools::tools::HELM;
use crate::ui;

/// Namespace used for pod lookups when none was given
const FALLBACK_NAMESPACE: &str = "default";

/// Everything one run needs
#[derive(Debug, Clone)]
pub struct DeployConfig<'a> {
    pub raw: &'a RawConfig,
    pub resolve: ResolveOptions,
    pub versions: VersionOverrides,
    pub upgrade: UpgradeOptions,
    pub flags: PipelineFlags,
}

/// Service for orchestrating deployments
pub struct DeployService<'a, R: ToolRunner, P: Prompter> {
    runner: &'a R,
    prompter: &'a P,
    env: &'a dyn EnvLookup,
}

impl<'a, R: ToolRunner, P: Prompter> DeployService<'a, R, P> {
    pub fn new(runner: &'a R, prompter: &'a P, env: &'a dyn EnvLookup) -> Self {
        Self {
            runner,
            prompter,
            env,
        }
    }

    /// Execute every stage that the flags leave in
    pub async fn execute(&self, config: &DeployConfig<'_>) -> Result<DeployReport> {
        self.print_header(config);

        let mut report = DeployReport::default();
        let mut model: Option<ResolvedModel> = None;
        let mut stage = Stage::FIRST;

        while stage != Stage::Done {
            if stage.is_skipped(&config.flags) {
                debug!("Skipping: {}", stage.name());
                report.skipped.push(stage);
                stage = stage.next();
                continue;
            }

            info!("▶ Starting: {}", stage.name());
            let start = Instant::now();
            let result = self.execute_stage(config, stage, &mut model, &mut report).await;
            let duration = start.elapsed();

            match result {
                Ok(()) => {
                    info!(
                        "{} {} completed in {}",
                        "✅".green(),
                        stage.name(),
                        format_duration(duration)
                    );
                    report.results.push(StageResult::success(stage, duration));
                }
                Err(e) => {
                    let msg = format!("{:#}", e);
                    info!("{} {} failed: {}", "❌".red(), stage.name(), msg);
                    report
                        .results
                        .push(StageResult::failure(stage, duration, msg));

                    // Stop on first failure
                    self.print_summary(&report, Some(stage));
                    return Err(e);
                }
            }

            stage = stage.next();
        }

        debug!("Executed stages: {:?}", report.executed());
        self.print_summary(&report, None);
        Ok(report)
    }

    async fn execute_stage(
        &self,
        config: &DeployConfig<'_>,
        stage: Stage,
        model: &mut Option<ResolvedModel>,
        report: &mut DeployReport,
    ) -> Result<()> {
        if stage == Stage::ResolveConfig {
            *model = Some(self.stage_resolve(config));
            return Ok(());
        }

        let model = model
            .as_ref()
            .context("configuration must be resolved before later stages")?;

        match stage {
            Stage::ResolveConfig | Stage::Done => Ok(()),
            Stage::BuildManifest => self.stage_manifest(config, model),
            Stage::AddRepositories => self.stage_repositories(model).await,
            Stage::ProvisionPullSecret => self.stage_pull_secret(config, model).await,
            Stage::FetchSources => self.stage_fetch_sources(config, model).await,
            Stage::RunPreSteps => self.stage_local_steps(model, true).await,
            Stage::BuildLocalArtifacts => self.stage_build(model).await,
            Stage::UpdateDependencies => {
                HelmClient::new(self.runner)
                    .dependency_update(&model.umbrella.path)
                    .await
                    .context("There was an error updating the dependencies on the umbrella")?;
                Ok(())
            }
            Stage::Upgrade => {
                report.upgrade_output = Some(self.stage_upgrade(config, model).await?);
                Ok(())
            }
            Stage::RunPostSteps => self.stage_local_steps(model, false).await,
            Stage::RunPostExec => self.stage_post_exec(config, model).await,
        }
    }

    fn stage_resolve(&self, config: &DeployConfig<'_>) -> ResolvedModel {
        let model = ResolvedModel::build(
            config.raw,
            &config.resolve,
            self.env,
            &config.upgrade.working_dir,
        );
        debug!(
            "Umbrella {} from {}",
            model.umbrella.name,
            if model.umbrella.repository.is_empty() {
                "local path"
            } else {
                model.umbrella.repository.as_str()
            }
        );
        info!(
            "Resolved {} of {} services (environment: {})",
            model.services.len(),
            config.raw.services.len(),
            model.umbrella.environment.as_deref().unwrap_or("none")
        );
        for service in &model.services {
            debug!("   {} -> state {}", service.name, service.state);
        }
        model
    }

    fn stage_manifest(&self, config: &DeployConfig<'_>, model: &ResolvedModel) -> Result<()> {
        let manifest = Manifest::build(model, &config.versions, &config.upgrade.working_dir);
        let written = chart_file::write_dependencies(&model.umbrella.path, &manifest)
            .context("Failed to write umbrella dependencies")?;
        info!(
            "Wrote {} dependencies to {}",
            manifest.dependencies.len(),
            written.display()
        );
        Ok(())
    }

    async fn stage_repositories(&self, model: &ResolvedModel) -> Result<()> {
        let helm = HelmClient::new(self.runner);
        let listing = helm
            .repo_list()
            .await
            .context("Failed to list the existing helm chart repositories")?;

        for repo in &model.helm_repos {
            if helm::is_listed(&listing, &repo.name) {
                debug!("Chart repository {} already added", repo.name);
                continue;
            }

            let credentials = if repo.prompt_basic_auth {
                let username = value_or_prompt(
                    self.prompter,
                    &repo.username,
                    "username",
                    &format!("Username for chart repository {}", repo.name),
                    Secrecy::Visible,
                )?;
                let password = value_or_prompt(
                    self.prompter,
                    &repo.password,
                    "password",
                    &format!("Password for {}", username),
                    Secrecy::Hidden,
                )?;
                Some((username, password))
            } else {
                None
            };

            let url = helm::repository_url(
                &repo.url,
                credentials.as_ref().map(|(u, p)| (u.as_str(), p.as_str())),
            )?;
            helm.repo_add(&repo.name, &url)
                .await
                .with_context(|| format!("Failed to add chart repository {}", repo.name))?;
            info!("Added chart repository {}", repo.name);
        }
        Ok(())
    }

    async fn stage_pull_secret(&self, config: &DeployConfig<'_>, model: &ResolvedModel) -> Result<()> {
        if model.pull_secrets_name.is_empty() {
            info!("No pull secret configured, skipping");
            return Ok(());
        }

        let kube = KubeClient::new(self.runner);
        let namespace = config.upgrade.namespace.as_deref().filter(|n| !n.is_empty());

        if let Some(ns) = namespace {
            if let Err(e) = kube.ensure_namespace(ns).await {
                warn!("Namespace {} could not be created: {}", ns, e);
            }
        }

        let name = &model.pull_secrets_name;
        match kube.get_secret(name, namespace).await {
            Ok(_) => {
                info!("Pull secret {} already exists", name);
                Ok(())
            }
            Err(e) if e.output().contains("NotFound") => {
                let docker = &model.docker;
                if docker.is_empty() {
                    ui::print_info("An image pull secret is needed for the container registry.");
                }
                let credentials = crate::config::DockerCredentials {
                    email: value_or_prompt(
                        self.prompter,
                        &docker.email,
                        "email",
                        "Registry email address",
                        Secrecy::Visible,
                    )?,
                    username: value_or_prompt(
                        self.prompter,
                        &docker.username,
                        "username",
                        "Registry username",
                        Secrecy::Visible,
                    )?,
                    password: value_or_prompt(
                        self.prompter,
                        &docker.password,
                        "password",
                        "Registry password",
                        Secrecy::Hidden,
                    )?,
                };
                kube.create_pull_secret(name, &credentials, namespace)
                    .await
                    .context("error with kubectl create secret")?;
                info!("Created pull secret {}", name);
                Ok(())
            }
            Err(e) => Err(e).context("error with kubectl get secrets"),
        }
    }

    async fn stage_fetch_sources(&self, config: &DeployConfig<'_>, model: &ResolvedModel) -> Result<()> {
        let git = GitClient::new(self.runner);
        for service in model.local_dev_services() {
            if service.gitrepo.is_empty() {
                continue;
            }
            let target = config.upgrade.working_dir.join(&service.path);
            if target.exists() {
                debug!("{} already present at {}", service.name, target.display());
                continue;
            }
            info!("Cloning {} into {}", service.gitrepo, target.display());
            git.clone_into(&service.gitrepo, &target.display().to_string())
                .await
                .with_context(|| format!("Failed to clone {}", service.name))?;
        }
        Ok(())
    }

    async fn stage_local_steps(&self, model: &ResolvedModel, before: bool) -> Result<()> {
        for service in model.local_dev_services() {
            let steps = if before {
                &service.pre_deploy_steps
            } else {
                &service.post_deploy_steps
            };
            for step in steps {
                let output = self
                    .runner
                    .run(&step.cmd, &step.args)
                    .await
                    .with_context(|| format!("Step `{}` failed for {}", step.cmd, service.name))?;
                print_output(&output);
            }
        }
        Ok(())
    }

    async fn stage_build(&self, model: &ResolvedModel) -> Result<()> {
        let docker = DockerClient::new(self.runner);
        for service in model.local_dev_services() {
            if service.container_build.is_empty() {
                continue;
            }
            info!("Building container for {}", service.name);
            let output = docker
                .build(&service.container_build)
                .await
                .with_context(|| format!("Container build failed for {}", service.name))?;
            print_output(&output);
        }
        Ok(())
    }

    async fn stage_upgrade(&self, config: &DeployConfig<'_>, model: &ResolvedModel) -> Result<String> {
        let args = upgrade::synthesize(model, &config.upgrade);

        if config.flags.dry_run {
            return Ok(upgrade::render_command(HELM, &args));
        }

        let output = HelmClient::new(self.runner)
            .upgrade(&args)
            .await
            .context("Helm upgrade command reported error")?;
        print_output(&output);
        Ok(output)
    }

    async fn stage_post_exec(&self, config: &DeployConfig<'_>, model: &ResolvedModel) -> Result<()> {
        let kube = KubeClient::new(self.runner);
        let namespace = config
            .upgrade
            .namespace
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(FALLBACK_NAMESPACE);

        for service in model.local_dev_services() {
            for exec in &service.post_deploy_exec {
                let pod = kube
                    .first_pod(namespace, &exec.app)
                    .await
                    .with_context(|| format!("No pod found for app={}", exec.app))?;
                let output = kube
                    .exec(namespace, &exec.container, &pod, &exec.args)
                    .await
                    .with_context(|| format!("Exec failed in {}/{}", pod, exec.container))?;
                print_output(&output);
            }
        }
        Ok(())
    }

    fn print_header(&self, config: &DeployConfig<'_>) {
        let title = match config.upgrade.release.as_deref() {
            Some(release) if !release.is_empty() => {
                format!("Deploy: {} ({})", config.raw.umbrella.name, release)
            }
            _ => format!("Deploy: {}", config.raw.umbrella.name),
        };
        ui::print_header(&title);
        let plan: Vec<&str> = Stage::plan(&config.flags).iter().map(|s| s.name()).collect();
        ui::print_info(&format!("Stages: {}", plan.join(" → ")));
        if config.flags.dry_run {
            ui::print_warning("Dry run: the upgrade command will be printed, not executed");
        }
    }

    fn print_summary(&self, report: &DeployReport, failed: Option<Stage>) {
        println!();
        println!(
            "{}",
            "════════════════════════════════════════════════════════════".bright_blue()
        );

        match failed {
            None => ui::print_success(&format!(
                "Deploy completed in {}",
                format_duration(report.total_duration())
            )),
            Some(stage) => ui::print_error(&format!("Deploy failed at {}", stage.name())),
        }

        println!();
        for result in &report.results {
            let status = if result.success { "✅" } else { "❌" };
            println!(
                "   {} {} ({})",
                status,
                result.stage.name(),
                format_duration(result.duration)
            );
            if let Some(message) = &result.message {
                println!("      {}", message.red());
            }
        }
        for stage in &report.skipped {
            println!("   {}", format!("⏭  {} (skipped)", stage.name()).dimmed());
        }
        println!();
    }
}

/// Millisecond-precision human duration, e.g. `1s 250ms`
fn format_duration(duration: Duration) -> String {
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    humantime::format_duration(Duration::from_millis(millis)).to_string()
}

fn print_output(output: &str) {
    let trimmed = output.trim_end();
    if !trimmed.is_empty() {
        println!("{}", trimmed);
    }
}
