//! kubectl adapter: namespaces, pull secrets and in-pod exec

use tracing::info;

use crate::config::DockerCredentials;
use crate::error::ToolError;
use crate::tools::tools::KUBECTL;

use super::runner::ToolRunner;

/// Template printing the name of the first pod in a list
const FIRST_POD_TEMPLATE: &str = "{{(index .items 0).metadata.name}}";

pub struct KubeClient<'a, R: ToolRunner> {
    runner: &'a R,
}

impl<'a, R: ToolRunner> KubeClient<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Create `namespace` unless kubectl can already see it.
    ///
    /// Returns true when the namespace was created.
    pub async fn ensure_namespace(&self, namespace: &str) -> Result<bool, ToolError> {
        let lookup = self
            .runner
            .run(KUBECTL, &strings(&["get", "namespace", namespace]))
            .await;

        match lookup {
            Err(e) if e.output().contains("not found") => {
                self.runner
                    .run(KUBECTL, &strings(&["create", "namespace", namespace]))
                    .await?;
                info!("Namespace {} created", namespace);
                Ok(true)
            }
            _ => {
                info!("Namespace {} already exists, skipping", namespace);
                Ok(false)
            }
        }
    }

    /// `kubectl get secrets <name>`; the error output says `NotFound` when absent
    pub async fn get_secret(
        &self,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<String, ToolError> {
        let mut args = strings(&["get", "secrets", name]);
        push_namespace(&mut args, namespace);
        self.runner.run(KUBECTL, &args).await
    }

    pub async fn create_pull_secret(
        &self,
        name: &str,
        credentials: &DockerCredentials,
        namespace: Option<&str>,
    ) -> Result<String, ToolError> {
        self.runner
            .run(KUBECTL, &pull_secret_args(name, credentials, namespace))
            .await
    }

    /// Name of the first pod labelled `app=<app>`
    pub async fn first_pod(&self, namespace: &str, app: &str) -> Result<String, ToolError> {
        let selector = format!("app={}", app);
        let output = self
            .runner
            .run(
                KUBECTL,
                &strings(&[
                    "get",
                    "pods",
                    "-n",
                    namespace,
                    "-o",
                    "go-template",
                    "--template",
                    FIRST_POD_TEMPLATE,
                    "--selector",
                    &selector,
                ]),
            )
            .await?;
        Ok(output.trim().to_string())
    }

    pub async fn exec(
        &self,
        namespace: &str,
        container: &str,
        pod: &str,
        command: &[String],
    ) -> Result<String, ToolError> {
        let mut args = strings(&["exec", "-n", namespace, "-c", container, pod, "--"]);
        args.extend(command.iter().cloned());
        self.runner.run(KUBECTL, &args).await
    }
}

/// Arguments for `kubectl create secret docker-registry`
pub fn pull_secret_args(
    name: &str,
    credentials: &DockerCredentials,
    namespace: Option<&str>,
) -> Vec<String> {
    let mut args = strings(&["create", "secret", "docker-registry", name]);
    args.push(format!("--docker-username={}", credentials.username));
    args.push(format!("--docker-password={}", credentials.password));
    args.push(format!("--docker-email={}", credentials.email));
    push_namespace(&mut args, namespace);
    args
}

fn push_namespace(args: &mut Vec<String>, namespace: Option<&str>) {
    if let Some(ns) = namespace.filter(|n| !n.is_empty()) {
        args.push("--namespace".to_string());
        args.push(ns.to_string());
    }
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::runner::fake::RecordingRunner;

    fn credentials() -> DockerCredentials {
        DockerCredentials {
            username: "bot".to_string(),
            password: "hunter2".to_string(),
            email: "bot@example.com".to_string(),
        }
    }

    #[test]
    fn test_pull_secret_args() {
        assert_eq!(
            pull_secret_args("regcred", &credentials(), Some("dev")),
            vec![
                "create",
                "secret",
                "docker-registry",
                "regcred",
                "--docker-username=bot",
                "--docker-password=hunter2",
                "--docker-email=bot@example.com",
                "--namespace",
                "dev",
            ]
        );
        assert!(!pull_secret_args("regcred", &credentials(), None).contains(&"--namespace".to_string()));
    }

    #[tokio::test]
    async fn test_ensure_namespace_creates_when_missing() {
        let runner = RecordingRunner::new()
            .fail("kubectl get namespace", "Error from server (NotFound): namespaces \"dev\" not found");
        let created = KubeClient::new(&runner).ensure_namespace("dev").await.unwrap();
        assert!(created);
        assert_eq!(runner.calls_to("kubectl create"), vec!["kubectl create namespace dev"]);
    }

    #[tokio::test]
    async fn test_ensure_namespace_existing() {
        let runner = RecordingRunner::new().respond("kubectl get namespace", "dev   Active   3d");
        let created = KubeClient::new(&runner).ensure_namespace("dev").await.unwrap();
        assert!(!created);
        assert!(runner.calls_to("kubectl create").is_empty());
    }

    #[tokio::test]
    async fn test_first_pod_and_exec() {
        let runner = RecordingRunner::new().respond("kubectl get pods", "api-6d5f-abcde\n");
        let kube = KubeClient::new(&runner);
        let pod = kube.first_pod("dev", "api").await.unwrap();
        assert_eq!(pod, "api-6d5f-abcde");

        kube.exec("dev", "web", &pod, &["rake".to_string(), "db:migrate".to_string()])
            .await
            .unwrap();
        let calls = runner.calls();
        assert_eq!(
            calls[0],
            "kubectl get pods -n dev -o go-template --template {{(index .items 0).metadata.name}} --selector app=api"
        );
        assert_eq!(calls[1], "kubectl exec -n dev -c web api-6d5f-abcde -- rake db:migrate");
    }
}
