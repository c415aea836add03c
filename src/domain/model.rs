//! Resolved deployment model
//!
//! The single, read-only input to manifest building and command synthesis.
//! Built once per invocation from [`RawConfig`] plus the runtime selection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::{DockerCredentials, RawConfig};
use crate::error::ResolveError;

use super::environment;
use super::interpolate::{EnvLookup, Interpolator};
use super::state::{self, ResolvedService, StateSelection};

/// Helm major version that still talks to Tiller
pub const LEGACY_HELM_VERSION: u32 = 2;

/// What the caller asked for at resolution time
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Umbrella environment name; empty means "default"
    pub environment: String,

    pub selection: StateSelection,

    /// Values consulted before the process environment during interpolation
    pub extra_env: HashMap<String, String>,
}

/// A chart repository after credential interpolation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelmRepo {
    pub name: String,
    pub url: String,
    pub prompt_basic_auth: bool,
    pub username: String,
    pub password: String,
}

/// The umbrella chart with its chosen environment overlay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedUmbrella {
    pub name: String,
    pub repository: String,
    /// Absolute path to the chart directory
    pub path: PathBuf,
    /// Name of the selected environment, `None` when it did not resolve
    pub environment: Option<String>,
    pub files: Vec<String>,
    pub values: Vec<String>,
    pub flags: Vec<String>,
}

/// Everything needed to build the manifest and the upgrade command
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel {
    pub helm_version: u32,
    pub pull_secrets_name: String,
    pub docker: DockerCredentials,
    pub helm_repos: Vec<HelmRepo>,
    pub umbrella: ResolvedUmbrella,
    /// Successfully resolved services, in declaration order
    pub services: Vec<ResolvedService>,
    /// Lookups that failed without aborting resolution
    pub diagnostics: Vec<ResolveError>,
}

impl ResolvedModel {
    /// Resolve `raw` against the runtime options.
    ///
    /// Unknown states drop their service and an unknown environment leaves the
    /// umbrella without files, values or flags. Both are logged and kept in
    /// [`ResolvedModel::diagnostics`].
    pub fn build(
        raw: &RawConfig,
        options: &ResolveOptions,
        env: &dyn EnvLookup,
        working_dir: &Path,
    ) -> Self {
        let interp = Interpolator::new(&options.extra_env, env);
        let mut diagnostics = Vec::new();

        let mut services = Vec::with_capacity(raw.services.len());
        for decl in &raw.services {
            match state::resolve(decl, &options.selection, &interp) {
                Ok(service) => services.push(service),
                Err(e) => {
                    warn!("{}", e);
                    diagnostics.push(e);
                }
            }
        }

        let mut umbrella = ResolvedUmbrella {
            name: raw.umbrella.name.clone(),
            repository: raw.umbrella.repository.clone(),
            path: absolute(working_dir, &raw.umbrella.path),
            ..Default::default()
        };
        match environment::resolve(&options.environment, &raw.umbrella) {
            Ok(env_decl) => {
                umbrella.environment = Some(env_decl.name.clone());
                umbrella.files = env_decl.files.clone();
                umbrella.values = interp.expand_all(&env_decl.values);
                umbrella.flags = env_decl.flags.clone();
            }
            Err(e) => {
                warn!("{}", e);
                diagnostics.push(e);
            }
        }

        let helm_repos = raw
            .helm_repos
            .iter()
            .map(|repo| HelmRepo {
                name: repo.name.clone(),
                url: repo.url.clone(),
                prompt_basic_auth: repo.promptbasicauth,
                username: interp.expand(&repo.username),
                password: interp.expand(&repo.password),
            })
            .collect();

        Self {
            helm_version: if raw.helm_version == 0 {
                LEGACY_HELM_VERSION
            } else {
                raw.helm_version
            },
            pull_secrets_name: raw.pull_secrets_name.clone(),
            docker: DockerCredentials {
                username: interp.expand(&raw.docker_username),
                password: interp.expand(&raw.docker_password),
                email: interp.expand(&raw.docker_email),
            },
            helm_repos,
            umbrella,
            services,
            diagnostics,
        }
    }

    /// True when the legacy (Tiller) helm generation is in use
    pub fn is_legacy_helm(&self) -> bool {
        self.helm_version == LEGACY_HELM_VERSION
    }

    /// Services whose charts come from the local working copy
    pub fn local_dev_services(&self) -> impl Iterator<Item = &ResolvedService> {
        self.services.iter().filter(|s| s.is_local_dev())
    }
}

/// Join a possibly relative path onto `base`, dropping `.` components
fn absolute(base: &Path, path: &str) -> PathBuf {
    base.join(path).components().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StateOverrides;

    const CONFIG: &str = r#"
docker_username: ${DOCKER_USER}
docker_password: pa$$word
helm-repos:
  - name: private
    url: https://charts.example.com
    promptbasicauth: true
    username: ${REPO_USER}
umbrella:
  name: platform
  repository: "@stable"
  path: ./umbrella
  environments:
    - name: default
      files: [values.yaml]
      values: ["global.env=${ENV_NAME}"]
    - name: prod
      files: [values.yaml, prod.yaml]
      flags: ["--atomic"]
services:
  - name: service1
    path: ./service1
    chart: service1-chart
    states:
      - state-name: default
        repository: some-registry
        version: 1.0.0
  - name: service2
    path: ./service2
    alias: alias-service2
    chart: service2-chart
    states:
      - state-name: default
        repository: some-registry
        version: 2.0.0
      - state-name: local
        repository: localdev
        version: 2.1.0
"#;

    fn build(options: &ResolveOptions) -> ResolvedModel {
        let raw = RawConfig::from_yaml(CONFIG).unwrap();
        let process: HashMap<String, String> = [
            ("DOCKER_USER", "ci-bot"),
            ("ENV_NAME", "from-process"),
            ("REPO_USER", "reader"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        ResolvedModel::build(&raw, options, &process, Path::new("/work"))
    }

    #[test]
    fn test_build_default_model() {
        let model = build(&ResolveOptions::default());

        assert_eq!(model.helm_version, LEGACY_HELM_VERSION);
        assert!(model.is_legacy_helm());
        assert_eq!(model.docker.username, "ci-bot");
        assert_eq!(model.docker.password, "pa$word");
        assert_eq!(model.helm_repos[0].username, "reader");
        assert!(model.helm_repos[0].prompt_basic_auth);

        assert_eq!(model.umbrella.path, PathBuf::from("/work/umbrella"));
        assert_eq!(model.umbrella.environment.as_deref(), Some("default"));
        assert_eq!(model.umbrella.values, vec!["global.env=from-process"]);

        assert_eq!(model.services.len(), 2);
        assert_eq!(model.local_dev_services().count(), 0);
        assert!(model.diagnostics.is_empty());
    }

    #[test]
    fn test_extra_env_overrides_process_env() {
        let options = ResolveOptions {
            extra_env: [("ENV_NAME".to_string(), "from-flag".to_string())]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        let model = build(&options);
        assert_eq!(model.umbrella.values, vec!["global.env=from-flag"]);
    }

    #[test]
    fn test_unknown_state_drops_service() {
        let options = ResolveOptions {
            selection: StateSelection {
                force_all: Some("local".to_string()),
                per_service: StateOverrides::default(),
            },
            ..Default::default()
        };
        let model = build(&options);

        assert_eq!(model.services.len(), 1);
        assert_eq!(model.services[0].name, "service2");
        assert_eq!(
            model.diagnostics,
            vec![ResolveError::StateNotFound {
                service: "service1".to_string(),
                state: "local".to_string(),
            }]
        );
    }

    #[test]
    fn test_unknown_environment_yields_empty_overlay() {
        let options = ResolveOptions {
            environment: "staging".to_string(),
            ..Default::default()
        };
        let model = build(&options);

        assert_eq!(model.umbrella.name, "platform");
        assert!(model.umbrella.environment.is_none());
        assert!(model.umbrella.files.is_empty());
        assert!(model.umbrella.values.is_empty());
        assert!(model.umbrella.flags.is_empty());
        assert_eq!(model.services.len(), 2);
        assert_eq!(model.diagnostics.len(), 1);
    }

    #[test]
    fn test_named_environment_carries_flags() {
        let options = ResolveOptions {
            environment: "prod".to_string(),
            ..Default::default()
        };
        let model = build(&options);
        assert_eq!(model.umbrella.files, vec!["values.yaml", "prod.yaml"]);
        assert_eq!(model.umbrella.flags, vec!["--atomic"]);
    }

    #[test]
    fn test_local_service_flows_into_manifest_and_upgrade() {
        use crate::config::VersionOverrides;
        use crate::domain::manifest::Manifest;
        use crate::domain::upgrade::{synthesize, UpgradeOptions, CACHE_BUST_KEY};

        let options = ResolveOptions {
            selection: StateSelection {
                force_all: None,
                per_service: StateOverrides::parse(&["service2=local"]),
            },
            ..Default::default()
        };
        let model = build(&options);

        let manifest = Manifest::build(&model, &VersionOverrides::default(), Path::new("/work"));
        assert_eq!(manifest.dependencies[0].repository, "some-registry");
        assert_eq!(manifest.dependencies[0].version, "1.0.0");
        let locator = &manifest.dependencies[1].repository;
        assert!(locator.starts_with("file:///work/"));
        assert!(locator.ends_with("service2/service2-chart"));

        let args = synthesize(
            &model,
            &UpgradeOptions {
                release: Some("platform".to_string()),
                timestamp: 42,
                ..Default::default()
            },
        );
        let busts: Vec<&String> = args
            .iter()
            .filter(|a| a.contains(&format!(".{}=", CACHE_BUST_KEY)))
            .collect();
        assert_eq!(busts, vec![&format!("alias-service2.{}=42", CACHE_BUST_KEY)]);
    }
}
