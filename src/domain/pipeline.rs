//! Deployment pipeline domain types
//!
//! Defines the deploy workflow as a state machine with explicit stages. Each
//! stage maps to one external tool invocation or batch of invocations. Success
//! advances with [`Stage::next`]; failure stops the run where it is.

use std::time::Duration;

/// Individual stages of a deployment, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Interpolate and select states/environment
    ResolveConfig,
    /// Write the umbrella dependency list
    BuildManifest,
    /// `helm repo add` for missing repositories
    AddRepositories,
    /// Ensure the namespace and image pull secret exist
    ProvisionPullSecret,
    /// Clone missing local working copies
    FetchSources,
    /// Local commands before the build
    RunPreSteps,
    /// Container builds for local services
    BuildLocalArtifacts,
    /// `helm dependency update`
    UpdateDependencies,
    /// `helm upgrade --install`
    Upgrade,
    /// Local commands after the deploy
    RunPostSteps,
    /// Commands executed inside deployed containers
    RunPostExec,
    /// Terminal state
    Done,
}

impl Stage {
    /// First stage of every run
    pub const FIRST: Stage = Stage::ResolveConfig;

    /// The stage that follows this one on success
    pub fn next(self) -> Stage {
        match self {
            Self::ResolveConfig => Self::BuildManifest,
            Self::BuildManifest => Self::AddRepositories,
            Self::AddRepositories => Self::ProvisionPullSecret,
            Self::ProvisionPullSecret => Self::FetchSources,
            Self::FetchSources => Self::RunPreSteps,
            Self::RunPreSteps => Self::BuildLocalArtifacts,
            Self::BuildLocalArtifacts => Self::UpdateDependencies,
            Self::UpdateDependencies => Self::Upgrade,
            Self::Upgrade => Self::RunPostSteps,
            Self::RunPostSteps => Self::RunPostExec,
            Self::RunPostExec => Self::Done,
            Self::Done => Self::Done,
        }
    }

    /// Whether the flags remove this stage from the run
    pub fn is_skipped(self, flags: &PipelineFlags) -> bool {
        match self {
            Self::ResolveConfig | Self::BuildManifest | Self::Done => false,
            Self::AddRepositories | Self::FetchSources => flags.offline,
            Self::ProvisionPullSecret | Self::Upgrade => flags.requirements_only,
            Self::RunPreSteps
            | Self::BuildLocalArtifacts
            | Self::RunPostSteps
            | Self::RunPostExec => flags.skip_build || flags.requirements_only,
            Self::UpdateDependencies => flags.skip_dependency_update || flags.offline,
        }
    }

    /// Every stage that will execute under `flags`, in order
    pub fn plan(flags: &PipelineFlags) -> Vec<Stage> {
        let mut stages = Vec::new();
        let mut stage = Self::FIRST;
        while stage != Self::Done {
            if !stage.is_skipped(flags) {
                stages.push(stage);
            }
            stage = stage.next();
        }
        stages
    }

    /// Human-readable name for the stage
    pub fn name(&self) -> &'static str {
        match self {
            Self::ResolveConfig => "Resolve Config",
            Self::BuildManifest => "Build Manifest",
            Self::AddRepositories => "Add Repositories",
            Self::ProvisionPullSecret => "Provision Pull Secret",
            Self::FetchSources => "Fetch Sources",
            Self::RunPreSteps => "Pre-Deploy Steps",
            Self::BuildLocalArtifacts => "Build Containers",
            Self::UpdateDependencies => "Update Dependencies",
            Self::Upgrade => "Upgrade",
            Self::RunPostSteps => "Post-Deploy Steps",
            Self::RunPostExec => "Post-Deploy Exec",
            Self::Done => "Done",
        }
    }
}

/// Runtime switches that change which stages run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineFlags {
    /// Skip container builds and their pre/post steps
    pub skip_build: bool,

    /// Skip `helm dependency update`
    pub skip_dependency_update: bool,

    /// Return the upgrade command instead of running it
    pub dry_run: bool,

    /// Stop after writing the manifest and fetching dependencies
    pub requirements_only: bool,

    /// Touch nothing outside the umbrella chart directory
    pub offline: bool,
}

/// Result of one executed stage
#[derive(Debug)]
pub struct StageResult {
    pub stage: Stage,
    pub success: bool,
    pub duration: Duration,
    pub message: Option<String>,
}

impl StageResult {
    pub fn success(stage: Stage, duration: Duration) -> Self {
        Self {
            stage,
            success: true,
            duration,
            message: None,
        }
    }

    pub fn failure(stage: Stage, duration: Duration, message: impl Into<String>) -> Self {
        Self {
            stage,
            success: false,
            duration,
            message: Some(message.into()),
        }
    }
}

/// Outcome of a completed pipeline
#[derive(Debug, Default)]
pub struct DeployReport {
    pub results: Vec<StageResult>,
    pub skipped: Vec<Stage>,
    /// Helm's output, or the rendered command in dry-run mode
    pub upgrade_output: Option<String>,
}

impl DeployReport {
    /// Stages that ran, in order
    pub fn executed(&self) -> Vec<Stage> {
        self.results.iter().map(|r| r.stage).collect()
    }

    pub fn total_duration(&self) -> Duration {
        self.results.iter().map(|r| r.duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_plan_order() {
        let plan = Stage::plan(&PipelineFlags::default());
        assert_eq!(
            plan,
            vec![
                Stage::ResolveConfig,
                Stage::BuildManifest,
                Stage::AddRepositories,
                Stage::ProvisionPullSecret,
                Stage::FetchSources,
                Stage::RunPreSteps,
                Stage::BuildLocalArtifacts,
                Stage::UpdateDependencies,
                Stage::Upgrade,
                Stage::RunPostSteps,
                Stage::RunPostExec,
            ]
        );
    }

    #[test]
    fn test_done_is_terminal() {
        assert_eq!(Stage::Done.next(), Stage::Done);
        assert_eq!(Stage::RunPostExec.next(), Stage::Done);
    }

    #[test]
    fn test_skip_build_removes_build_and_steps() {
        let flags = PipelineFlags {
            skip_build: true,
            ..Default::default()
        };
        let plan = Stage::plan(&flags);
        assert!(!plan.contains(&Stage::RunPreSteps));
        assert!(!plan.contains(&Stage::BuildLocalArtifacts));
        assert!(!plan.contains(&Stage::RunPostSteps));
        assert!(!plan.contains(&Stage::RunPostExec));
        assert!(plan.contains(&Stage::Upgrade));
        assert!(plan.contains(&Stage::UpdateDependencies));
    }

    #[test]
    fn test_skip_dependency_update() {
        let flags = PipelineFlags {
            skip_dependency_update: true,
            ..Default::default()
        };
        assert!(Stage::UpdateDependencies.is_skipped(&flags));
        assert!(!Stage::Upgrade.is_skipped(&flags));
    }

    #[test]
    fn test_dry_run_keeps_upgrade_stage() {
        let flags = PipelineFlags {
            dry_run: true,
            ..Default::default()
        };
        assert!(!Stage::Upgrade.is_skipped(&flags));
    }

    #[test]
    fn test_requirements_plans() {
        let full = Stage::plan(&PipelineFlags {
            requirements_only: true,
            ..Default::default()
        });
        assert_eq!(
            full,
            vec![
                Stage::ResolveConfig,
                Stage::BuildManifest,
                Stage::AddRepositories,
                Stage::FetchSources,
                Stage::UpdateDependencies,
            ]
        );

        let fast = Stage::plan(&PipelineFlags {
            requirements_only: true,
            offline: true,
            ..Default::default()
        });
        assert_eq!(fast, vec![Stage::ResolveConfig, Stage::BuildManifest]);
    }

    #[test]
    fn test_report_helpers() {
        let report = DeployReport {
            results: vec![
                StageResult::success(Stage::ResolveConfig, Duration::from_millis(5)),
                StageResult::failure(Stage::BuildManifest, Duration::from_millis(10), "boom"),
            ],
            ..Default::default()
        };
        assert_eq!(report.executed(), vec![Stage::ResolveConfig, Stage::BuildManifest]);
        assert_eq!(report.total_duration(), Duration::from_millis(15));
    }
}
