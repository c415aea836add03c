//! Chart metadata serializer
//!
//! Charts with `apiVersion: v2` keep their dependencies inside `Chart.yaml`;
//! `v1` charts keep them in a separate `requirements.yaml`. Every other key of
//! an existing `Chart.yaml` is preserved on rewrite.

use serde_yaml::{Mapping, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::manifest::Manifest;
use crate::error::ManifestError;

pub const CHART_FILE: &str = "Chart.yaml";
pub const REQUIREMENTS_FILE: &str = "requirements.yaml";

/// Where a chart expects its dependency list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSchema {
    /// `requirements.yaml`
    V1,
    /// `dependencies:` inside `Chart.yaml`
    V2,
}

/// Parsed `Chart.yaml` together with its schema
#[derive(Debug, Clone)]
pub struct ChartFile {
    pub schema: ChartSchema,
    document: Mapping,
}

impl ChartFile {
    /// Read `<chart_dir>/Chart.yaml`
    pub fn read(chart_dir: &Path) -> Result<Self, ManifestError> {
        let path = chart_dir.join(CHART_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| ManifestError::ReadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content, &path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ManifestError> {
        let document: Mapping =
            serde_yaml::from_str(content).map_err(|e| ManifestError::ParseFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let api_version = document
            .get("apiVersion")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let schema = match api_version {
            "v1" => ChartSchema::V1,
            "v2" => ChartSchema::V2,
            other => {
                return Err(ManifestError::UnknownApiVersion {
                    path: path.display().to_string(),
                    api_version: other.to_string(),
                })
            }
        };

        Ok(Self { schema, document })
    }
}

/// Write `manifest` where the chart in `chart_dir` expects it.
///
/// Returns the path of the file written.
pub fn write_dependencies(chart_dir: &Path, manifest: &Manifest) -> Result<PathBuf, ManifestError> {
    let chart = ChartFile::read(chart_dir)?;

    let (path, content) = match chart.schema {
        ChartSchema::V2 => {
            let path = chart_dir.join(CHART_FILE);
            let mut document = chart.document;
            let dependencies =
                serde_yaml::to_value(&manifest.dependencies).map_err(|e| write_failed(&path, e))?;
            document.insert(Value::String("dependencies".to_string()), dependencies);
            let content = serde_yaml::to_string(&document).map_err(|e| write_failed(&path, e))?;
            (path, content)
        }
        ChartSchema::V1 => {
            let path = chart_dir.join(REQUIREMENTS_FILE);
            let content = manifest.to_yaml().map_err(|e| write_failed(&path, e))?;
            (path, content)
        }
    };

    atomic_write(&path, &content)?;
    debug!("Wrote {} dependencies to {}", manifest.dependencies.len(), path.display());
    Ok(path)
}

/// Replace `path` so readers never observe a partial file
fn atomic_write(path: &Path, content: &str) -> Result<(), ManifestError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_failed(path, e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| write_failed(path, e))?;
    tmp.persist(path).map_err(|e| write_failed(path, e))?;
    Ok(())
}

fn write_failed(path: &Path, e: impl std::fmt::Display) -> ManifestError {
    ManifestError::WriteFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}
