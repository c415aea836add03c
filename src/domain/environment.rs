//! Umbrella environment selection.

use crate::config::{EnvironmentDecl, UmbrellaDecl};
use crate::error::ResolveError;

/// Environment used when the caller does not name one
pub const DEFAULT_ENVIRONMENT: &str = "default";

/// Find the requested environment block; an empty name means [`DEFAULT_ENVIRONMENT`].
///
/// Names are matched exactly and the first match wins.
pub fn resolve<'a>(
    requested: &str,
    umbrella: &'a UmbrellaDecl,
) -> Result<&'a EnvironmentDecl, ResolveError> {
    let name = if requested.is_empty() {
        DEFAULT_ENVIRONMENT
    } else {
        requested
    };

    umbrella
        .environments
        .iter()
        .find(|env| env.name == name)
        .ok_or_else(|| ResolveError::EnvironmentNotFound {
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn umbrella() -> UmbrellaDecl {
        UmbrellaDecl {
            name: "platform".to_string(),
            environments: vec![
                EnvironmentDecl {
                    name: "default".to_string(),
                    files: vec!["values.yaml".to_string()],
                    ..Default::default()
                },
                EnvironmentDecl {
                    name: "prod".to_string(),
                    files: vec!["prod.yaml".to_string()],
                    ..Default::default()
                },
                EnvironmentDecl {
                    name: "prod".to_string(),
                    files: vec!["shadowed.yaml".to_string()],
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_name_selects_default() {
        let umbrella = umbrella();
        assert_eq!(resolve("", &umbrella).unwrap().files, vec!["values.yaml"]);
    }

    #[test]
    fn test_duplicate_names_first_match_wins() {
        let umbrella = umbrella();
        assert_eq!(resolve("prod", &umbrella).unwrap().files, vec!["prod.yaml"]);
    }

    #[test]
    fn test_unknown_environment() {
        let umbrella = umbrella();
        assert_eq!(
            resolve("staging", &umbrella).unwrap_err(),
            ResolveError::EnvironmentNotFound {
                name: "staging".to_string()
            }
        );
    }
}
