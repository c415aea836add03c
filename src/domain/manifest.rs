//! Dependency manifest for the umbrella chart
//!
//! Converts resolved services into the dependency list helm fetches. The
//! on-disk shape (Chart.yaml vs requirements.yaml) is chosen by
//! [`crate::infrastructure::chart_file`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::VersionOverrides;

use super::model::ResolvedModel;
use super::state::ResolvedService;

/// One umbrella dependency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repository: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub condition: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none", rename = "import-values")]
    pub import_values: Option<Vec<serde_yaml::Value>>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alias: String,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Ordered dependency list, schema-agnostic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub dependencies: Vec<Dependency>,
}

impl Manifest {
    /// Build the manifest for every resolved service, in declaration order
    pub fn build(model: &ResolvedModel, overrides: &VersionOverrides, working_dir: &Path) -> Self {
        let dependencies = model
            .services
            .iter()
            .map(|service| Dependency {
                name: service.chart.clone(),
                version: overrides
                    .version_for(&service.name)
                    .map(str::to_string)
                    .unwrap_or_else(|| service.version.clone()),
                repository: repository_locator(service, working_dir),
                condition: service.condition.clone(),
                tags: service.tags.clone(),
                enabled: service.enabled,
                import_values: service.importvalues.clone(),
                alias: service.alias.clone(),
            })
            .collect();

        Self { dependencies }
    }

    /// Render as a standalone `dependencies:` YAML document
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// `file://` reference to the local chart for `localdev`, the declared repository otherwise
fn repository_locator(service: &ResolvedService, working_dir: &Path) -> String {
    if service.is_local_dev() {
        format!(
            "file://{}/{}/{}",
            working_dir.display(),
            service.path,
            service.chart
        )
    } else {
        service.repository.clone()
    }
}
