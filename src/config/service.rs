//! Service declarations and their named states.

use serde::{Deserialize, Deserializer, Serialize};

/// Sentinel repository meaning "build this chart from the local working copy"
pub const LOCALDEV: &str = "localdev";

/// A deployable unit, declared once with several named states
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDecl {
    /// Service name (the key used by `--service-state` and `--state-v-override`)
    pub name: String,

    /// Local working copy path, relative to the config file
    #[serde(default)]
    pub path: String,

    /// Source control locator used to clone `path` when missing
    #[serde(default)]
    pub gitrepo: String,

    /// Dependency alias in the umbrella chart
    #[serde(default)]
    pub alias: String,

    /// Chart name
    #[serde(default)]
    pub chart: String,

    /// Defaults merged into whichever state is chosen
    #[serde(default, rename = "dep-values-all-states")]
    pub all_states: AllStatesDefaults,

    #[serde(default)]
    pub states: Vec<StateDecl>,
}

impl ServiceDecl {
    /// Find a state block by exact name, first match wins
    pub fn state(&self, name: &str) -> Option<&StateDecl> {
        self.states.iter().find(|s| s.name == name)
    }
}

/// Dependency fields shared by every state of a service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllStatesDefaults {
    #[serde(default)]
    pub condition: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub importvalues: Option<Vec<serde_yaml::Value>>,
}

/// One deployment variant of a service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDecl {
    #[serde(rename = "state-name")]
    pub name: String,

    /// Arguments to the container builder, run for `localdev` services
    #[serde(default, rename = "container-build")]
    pub container_build: String,

    /// Chart repository, or [`LOCALDEV`]
    #[serde(default)]
    pub repository: String,

    /// `key=value` overrides scoped to this service's chart
    #[serde(default, rename = "helm-values")]
    pub helm_values: Vec<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub version: String,

    #[serde(default)]
    pub condition: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub importvalues: Option<Vec<serde_yaml::Value>>,

    #[serde(default, rename = "preDeploySteps")]
    pub pre_deploy_steps: Vec<StepDecl>,

    #[serde(default, rename = "postDeploySteps")]
    pub post_deploy_steps: Vec<StepDecl>,

    #[serde(default, rename = "postDeployExec")]
    pub post_deploy_exec: Vec<ExecStepDecl>,
}

/// A local command run before or after the deploy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDecl {
    #[serde(default)]
    pub cmd: String,

    #[serde(default)]
    pub args: Vec<String>,
}

/// A command run inside a deployed container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecStepDecl {
    /// Value of the `app` label used to pick the pod
    #[serde(default)]
    pub app: String,

    #[serde(default)]
    pub container: String,

    #[serde(default)]
    pub args: Vec<String>,
}

/// Accept `version: 1.2` (a YAML float) as well as quoted strings.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_yaml::Value::Null => String::new(),
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected a scalar version, got {:?}",
                other
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: &str = r#"
name: api
path: ./api
gitrepo: git@example.com:org/api.git
chart: api-chart
dep-values-all-states:
  condition: api.enabled
  tags: [backend]
states:
  - state-name: default
    repository: "@stable"
    version: 1.0
  - state-name: local
    repository: localdev
    container-build: build -t api:dev ./api
    version: "0.1.0"
    preDeploySteps:
      - cmd: make
        args: [assets]
    postDeployExec:
      - app: api
        container: web
        args: [rake, db:migrate]
"#;

    #[test]
    fn test_parse_service_decl() {
        let service: ServiceDecl = serde_yaml::from_str(SERVICE).unwrap();
        assert_eq!(service.chart, "api-chart");
        assert_eq!(service.all_states.tags, vec!["backend"]);
        assert_eq!(service.states.len(), 2);

        let local = service.state("local").unwrap();
        assert_eq!(local.repository, LOCALDEV);
        assert_eq!(local.pre_deploy_steps[0].cmd, "make");
        assert_eq!(local.post_deploy_exec[0].container, "web");
        assert!(local.importvalues.is_none());
    }

    #[test]
    fn test_numeric_version_is_stringified() {
        let service: ServiceDecl = serde_yaml::from_str(SERVICE).unwrap();
        assert_eq!(service.state("default").unwrap().version, "1.0");
    }

    #[test]
    fn test_state_lookup_first_match_wins() {
        let service = ServiceDecl {
            name: "api".to_string(),
            states: vec![
                StateDecl {
                    name: "default".to_string(),
                    version: "1".to_string(),
                    ..Default::default()
                },
                StateDecl {
                    name: "default".to_string(),
                    version: "2".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(service.state("default").unwrap().version, "1");
        assert!(service.state("missing").is_none());
    }
}
