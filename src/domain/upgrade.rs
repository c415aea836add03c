//! `helm upgrade --install` command synthesis
//!
//! Pure function of the resolved model and [`UpgradeOptions`]: identical input
//! gives byte-identical arguments. The clock and working directory are inputs,
//! which is what lets dry-run print exactly what would have been executed.

use std::path::PathBuf;

use super::model::ResolvedModel;

/// Control-plane namespace that needs no explicit flag on legacy helm
pub const DEFAULT_TILLER_NAMESPACE: &str = "kube-system";

/// Value key set on every `localdev` dependency to force a redeploy
pub const CACHE_BUST_KEY: &str = "cacheBust";

/// Timeout handed to helm, in seconds
const UPGRADE_TIMEOUT_SECS: u32 = 1800;

/// Runtime settings for the upgrade invocation
#[derive(Debug, Clone)]
pub struct UpgradeOptions {
    /// Helm release name
    pub release: Option<String>,

    pub namespace: Option<String>,

    /// Legacy helm only: where Tiller runs
    pub tiller_namespace: String,

    /// Legacy helm only: talk to Tiller over TLS
    pub tls: bool,

    /// Wrap the call in the helm-secrets plugin
    pub use_secrets: bool,

    /// Pass `--debug`; output may include secrets
    pub reveal_all: bool,

    /// Directory the run was started from
    pub working_dir: PathBuf,

    /// Unix timestamp used for cache busting
    pub timestamp: i64,
}

impl Default for UpgradeOptions {
    fn default() -> Self {
        Self {
            release: None,
            namespace: None,
            tiller_namespace: DEFAULT_TILLER_NAMESPACE.to_string(),
            tls: false,
            use_secrets: false,
            reveal_all: false,
            working_dir: PathBuf::from("."),
            timestamp: 0,
        }
    }
}

/// Build the helm argument list (without the `helm` binary itself)
pub fn synthesize(model: &ResolvedModel, options: &UpgradeOptions) -> Vec<String> {
    let umbrella = &model.umbrella;
    let umbrella_path = umbrella.path.display().to_string();
    let mut args: Vec<String> = vec!["upgrade".into(), "--install".into()];

    if let Some(release) = options.release.as_deref().filter(|r| !r.is_empty()) {
        args.push(release.to_string());
    }

    args.push(umbrella_path.clone());

    for file in &umbrella.files {
        args.push("-f".into());
        args.push(format!("{}/{}", umbrella_path, file));
    }

    // Lets charts mount the project into local dev containers
    set(
        &mut args,
        format!("global.projectLocation={}", options.working_dir.display()),
    );

    for value in &umbrella.values {
        set(&mut args, value.clone());
    }

    for service in &model.services {
        for value in &service.helm_values {
            set(&mut args, format!("{}.{}", service.dependency_name(), value));
        }
    }

    for service in model.local_dev_services() {
        set(
            &mut args,
            format!(
                "{}.{}={}",
                service.dependency_name(),
                CACHE_BUST_KEY,
                options.timestamp
            ),
        );
    }

    if let Some(namespace) = options.namespace.as_deref().filter(|n| !n.is_empty()) {
        args.push("--namespace".into());
        args.push(namespace.to_string());
    }

    args.push("--timeout".into());
    if model.is_legacy_helm() {
        args.push(UPGRADE_TIMEOUT_SECS.to_string());
    } else {
        args.push(format!("{}s", UPGRADE_TIMEOUT_SECS));
    }
    args.push("--wait".into());

    args.extend(umbrella.flags.iter().cloned());

    if model.is_legacy_helm() {
        if !options.tiller_namespace.is_empty()
            && options.tiller_namespace != DEFAULT_TILLER_NAMESPACE
        {
            args.push("--tiller-namespace".into());
            args.push(options.tiller_namespace.clone());
        }
        if options.tls {
            args.push("--tls".into());
        }
    }

    if options.reveal_all {
        args.push("--debug".into());
    }

    if options.use_secrets {
        args.insert(0, "secrets".into());
    }

    args
}

/// Render a command line for display, e.g. in dry-run output
pub fn render_command(binary: &str, args: &[String]) -> String {
    std::iter::once(binary)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

fn set(args: &mut Vec<String>, value: String) {
    args.push("--set".into());
    args.push(value);
}
