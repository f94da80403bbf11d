use crate::error::{Result, StacksError};
use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::process::ExitStatus;
use tokio::process::Command;

/// The container runtime as seen by the dispatcher: it runs a compose
/// invocation in a given directory, or a system-level command, and reports
/// the exit code. The working directory is always passed explicitly.
#[async_trait]
pub trait ComposeRuntime: Send + Sync {
    /// `docker compose <args>` with `dir` as the project directory.
    async fn compose(&self, dir: &Path, args: &[String]) -> Result<i32>;

    /// `docker <args>`, not tied to any stack.
    async fn system(&self, args: &[String]) -> Result<i32>;
}

#[derive(Debug, Clone)]
pub struct DockerCli {
    pub docker_bin: String,
}

impl DockerCli {
    pub fn new(docker_bin: impl Into<String>) -> Self {
        Self {
            docker_bin: docker_bin.into(),
        }
    }

    async fn status(&self, cmd: &mut Command) -> Result<i32> {
        let status = cmd.status().await.map_err(|source| StacksError::Spawn {
            bin: self.docker_bin.clone(),
            source,
        })?;
        Ok(exit_code(status))
    }
}

#[async_trait]
impl ComposeRuntime for DockerCli {
    async fn compose(&self, dir: &Path, args: &[String]) -> Result<i32> {
        tracing::debug!(dir = %dir.display(), ?args, "docker compose");
        let mut cmd = Command::new(&self.docker_bin);
        cmd.current_dir(dir).arg("compose").args(args);
        self.status(&mut cmd).await
    }

    async fn system(&self, args: &[String]) -> Result<i32> {
        tracing::debug!(?args, "docker");
        let mut cmd = Command::new(&self.docker_bin);
        cmd.args(args);
        self.status(&mut cmd).await
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(if status.success() { 0 } else { 1 })
}

/// What `init` learns about the local runtime.
#[derive(Debug, Clone)]
pub struct DockerMeta {
    pub backend: String,
    pub context_name: String,
    pub host: String,
    pub available: bool,
    pub compose_version: Option<String>,
    pub docker_bin: String,
}

impl DockerMeta {
    pub async fn detect(cwd: &Path, docker_bin: &str) -> Self {
        let docker_bin = docker_bin.to_string();
        let cwd_buf = cwd.to_path_buf();

        let context_check = async {
            let mut ctx_name = "default".to_string();
            let mut backend = "unknown".to_string();
            let mut host = String::new();

            if let Ok(ctx) = cmd_out(&docker_bin, &cwd_buf, &["context", "show"]).await {
                ctx_name = ctx.trim().to_string();
                if let Ok(info) = cmd_out(&docker_bin, &cwd_buf, &["context", "inspect", &ctx_name]).await {
                    if let Ok(v) = serde_json::from_str::<Value>(&info) {
                        host = v
                            .get(0)
                            .and_then(|x| x.get("Endpoints"))
                            .and_then(|x| x.get("docker"))
                            .and_then(|x| x.get("Host"))
                            .and_then(|x| x.as_str())
                            .unwrap_or("")
                            .to_string();
                        backend = classify(&ctx_name, &host);
                    }
                }
            }
            (ctx_name, backend, host)
        };

        let availability_check = async {
            Command::new(&docker_bin)
                .current_dir(&cwd_buf)
                .args(["info"])
                .output()
                .await
                .map(|o| o.status.success())
                .unwrap_or(false)
        };

        let compose_check = async {
            cmd_out(&docker_bin, &cwd_buf, &["compose", "version", "--short"])
                .await
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let ((context_name, backend, host), available, compose_version) =
            tokio::join!(context_check, availability_check, compose_check);

        DockerMeta {
            backend,
            context_name,
            host,
            available,
            compose_version,
            docker_bin,
        }
    }

    pub fn usable(&self) -> bool {
        self.available && self.compose_version.is_some()
    }
}

fn classify(context_name: &str, host: &str) -> String {
    let s = format!("{context_name} {host}").to_lowercase();
    if s.contains("colima") {
        "colima".to_string()
    } else if s.contains("podman") {
        "podman".to_string()
    } else if s.contains("desktop") {
        "docker-desktop".to_string()
    } else {
        "docker".to_string()
    }
}

async fn cmd_out(bin: &str, cwd: &Path, args: &[&str]) -> anyhow::Result<String> {
    let out = Command::new(bin).current_dir(cwd).args(args).output().await?;
    if !out.status.success() {
        return Err(anyhow!("command failed: {bin} {:?}", args));
    }
    Ok(String::from_utf8_lossy(&out.stdout).trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_backends() {
        assert_eq!(classify("colima", "unix:///Users/me/.colima/default/docker.sock"), "colima");
        assert_eq!(classify("default", "unix:///var/run/docker.sock"), "docker");
        assert_eq!(classify("desktop-linux", ""), "docker-desktop");
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let rt = DockerCli::new("definitely-not-a-docker-binary-7f3a");
        let dir = tempfile::tempdir().unwrap();
        let err = rt.compose(dir.path(), &["ps".to_string()]).await.unwrap_err();
        assert!(matches!(err, StacksError::Spawn { .. }));
    }

    #[tokio::test]
    async fn detect_without_runtime_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let meta = DockerMeta::detect(dir.path(), "definitely-not-a-docker-binary-7f3a").await;
        assert!(!meta.available);
        assert!(!meta.usable());
        assert_eq!(meta.context_name, "default");
    }
}
