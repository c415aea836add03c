//! State resolution
//!
//! Reduces a [`ServiceDecl`] to exactly one chosen state, merging the
//! service's all-states defaults into fields the state left at their zero value.

use crate::config::{ServiceDecl, StateOverrides, LOCALDEV};
use crate::error::ResolveError;

use super::interpolate::Interpolator;

/// Name of the state used when nothing else is requested
pub const DEFAULT_STATE: &str = "default";

/// How states are chosen for every service in one run
#[derive(Debug, Clone, Default)]
pub struct StateSelection {
    /// Force every service into this state (`--set-state-all`)
    pub force_all: Option<String>,

    /// Per-service choices (`--service-state name=state`)
    pub per_service: StateOverrides,
}

impl StateSelection {
    /// The state name to look up for `service`
    pub fn requested_for(&self, service: &str) -> &str {
        if let Some(all) = self.force_all.as_deref().filter(|s| !s.is_empty()) {
            return all;
        }
        self.per_service.get(service).unwrap_or(DEFAULT_STATE)
    }
}

/// A local command step after interpolation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub cmd: String,
    pub args: Vec<String>,
}

/// An in-cluster exec step after interpolation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecStep {
    pub app: String,
    pub container: String,
    pub args: Vec<String>,
}

/// A service reduced to its chosen state
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedService {
    pub name: String,
    pub path: String,
    pub gitrepo: String,
    pub alias: String,
    pub chart: String,
    /// Name of the state that was selected
    pub state: String,
    pub container_build: String,
    pub repository: String,
    pub helm_values: Vec<String>,
    pub version: String,
    pub condition: String,
    pub tags: Vec<String>,
    pub enabled: bool,
    pub importvalues: Option<Vec<serde_yaml::Value>>,
    pub pre_deploy_steps: Vec<Step>,
    pub post_deploy_steps: Vec<Step>,
    pub post_deploy_exec: Vec<ExecStep>,
}

impl ResolvedService {
    /// Dependency name inside the umbrella: the alias if set, otherwise the chart
    pub fn dependency_name(&self) -> &str {
        if self.alias.is_empty() {
            &self.chart
        } else {
            &self.alias
        }
    }

    /// True when the chart is built from the local working copy
    pub fn is_local_dev(&self) -> bool {
        self.repository == LOCALDEV
    }
}

/// Resolve one service against the selection
pub fn resolve(
    service: &ServiceDecl,
    selection: &StateSelection,
    interp: &Interpolator<'_>,
) -> Result<ResolvedService, ResolveError> {
    let requested = selection.requested_for(&service.name);
    let state = service
        .state(requested)
        .ok_or_else(|| ResolveError::StateNotFound {
            service: service.name.clone(),
            state: requested.to_string(),
        })?;

    let defaults = &service.all_states;

    let condition = if state.condition.is_empty() {
        defaults.condition.clone()
    } else {
        state.condition.clone()
    };
    let tags = if state.tags.is_empty() {
        defaults.tags.clone()
    } else {
        state.tags.clone()
    };
    let enabled = state.enabled || defaults.enabled;
    let importvalues = state
        .importvalues
        .clone()
        .or_else(|| defaults.importvalues.clone());

    Ok(ResolvedService {
        name: service.name.clone(),
        path: service.path.clone(),
        gitrepo: service.gitrepo.clone(),
        alias: service.alias.clone(),
        chart: service.chart.clone(),
        state: state.name.clone(),
        container_build: interp.expand(&state.container_build),
        repository: state.repository.clone(),
        helm_values: interp.expand_all(&state.helm_values),
        version: state.version.clone(),
        condition,
        tags,
        enabled,
        importvalues,
        pre_deploy_steps: state
            .pre_deploy_steps
            .iter()
            .map(|s| Step {
                cmd: s.cmd.clone(),
                args: interp.expand_all(&s.args),
            })
            .collect(),
        post_deploy_steps: state
            .post_deploy_steps
            .iter()
            .map(|s| Step {
                cmd: s.cmd.clone(),
                args: interp.expand_all(&s.args),
            })
            .collect(),
        post_deploy_exec: state
            .post_deploy_exec
            .iter()
            .map(|s| ExecStep {
                app: s.app.clone(),
                container: s.container.clone(),
                args: interp.expand_all(&s.args),
            })
            .collect(),
    })
}
