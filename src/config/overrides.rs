//! `name=value` runtime overrides supplied on the command line.

use std::collections::HashMap;
use tracing::warn;

use crate::error::ConfigError;

/// Per-service state selection from `--service-state name=state`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateOverrides {
    states: HashMap<String, String>,
}

impl StateOverrides {
    /// Build from raw `name=state` strings.
    ///
    /// Entries without `=` are ignored. A repeated name keeps the last state.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Self {
        let mut states = HashMap::new();
        for entry in entries {
            let entry = entry.as_ref();
            if entry.is_empty() {
                continue;
            }
            match entry.split_once('=') {
                Some((name, state)) => {
                    states.insert(name.to_string(), state.to_string());
                }
                None => warn!("Ignoring service state override without '=': {}", entry),
            }
        }
        Self { states }
    }

    /// The requested state for a service, if one was given and is non-empty
    pub fn get(&self, service: &str) -> Option<&str> {
        self.states
            .get(service)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Per-service version overrides from `--state-v-override name=version`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionOverrides {
    entries: Vec<String>,
}

impl VersionOverrides {
    pub fn new<S: Into<String>>(entries: impl IntoIterator<Item = S>) -> Self {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// First entry whose name matches exactly and which splits into exactly two parts
    pub fn version_for(&self, service: &str) -> Option<&str> {
        self.entries.iter().find_map(|entry| {
            let mut parts = entry.split('=');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(name), Some(version), None) if name == service => Some(version),
                _ => None,
            }
        })
    }
}

/// Parse repeated `KEY=VALUE` flags into a map (used for `--extra-env`)
pub fn parse_env_pairs<S: AsRef<str>>(
    field: &str,
    entries: &[S],
) -> Result<HashMap<String, String>, ConfigError> {
    entries
        .iter()
        .map(|entry| {
            let entry = entry.as_ref();
            entry
                .split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| ConfigError::InvalidPair {
                    field: field.to_string(),
                    value: entry.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_overrides_parse() {
        let overrides = StateOverrides::parse(&["api=local", "", "broken", "web=debug", "api=canary"]);
        assert_eq!(overrides.get("api"), Some("canary"));
        assert_eq!(overrides.get("web"), Some("debug"));
        assert_eq!(overrides.get("broken"), None);
        assert_eq!(overrides.get("worker"), None);
    }

    #[test]
    fn test_empty_state_is_no_override() {
        let overrides = StateOverrides::parse(&["api="]);
        assert_eq!(overrides.get("api"), None);
    }

    #[test]
    fn test_version_override_first_match_wins() {
        let overrides = VersionOverrides::new(["api=2.0.0", "api=3.0.0", "web=1.1.0"]);
        assert_eq!(overrides.version_for("api"), Some("2.0.0"));
        assert_eq!(overrides.version_for("web"), Some("1.1.0"));
        assert_eq!(overrides.version_for("ap"), None);
    }

    #[test]
    fn test_version_override_requires_single_separator() {
        let overrides = VersionOverrides::new(["api=1=2", "api=4.0.0"]);
        assert_eq!(overrides.version_for("api"), Some("4.0.0"));
    }

    #[test]
    fn test_parse_env_pairs() {
        let env = parse_env_pairs("extra-env", &["FOO=bar", "WITH_EQ=a=b"]).unwrap();
        assert_eq!(env["FOO"], "bar");
        assert_eq!(env["WITH_EQ"], "a=b");

        let err = parse_env_pairs("extra-env", &["NOPE"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPair { .. }));
    }
}
