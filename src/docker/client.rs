//! Docker CLI client.
//!
//! All Docker interactions go through `DockerClient`, which provides
//! consistent timeout handling, error mapping to [`DockerError`], and a single
//! point where `Command::new("docker")` is constructed.

use super::{ContainerRuntime, DockerError, Removal, ResourceSnapshot};
use crate::config::ServiceInstance;
use async_trait::async_trait;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

/// Timeout for quick queries (`info`, `ps`, `inspect`, `stats`).
pub const INSPECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Timeout for `rm -f`; `stop` adds its grace period on top.
pub const REMOVE_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for `run` and `pull`, which may download large image layers.
pub const PULL_TIMEOUT: Duration = Duration::from_secs(600);

/// Label attached to every container this tool creates.
pub const MANAGED_LABEL: &str = "com.sttctl.managed=true";

/// Client for the `docker` CLI.
#[derive(Debug, Clone)]
pub struct DockerClient {
    binary: String,
}

impl DockerClient {
    pub fn new() -> Self {
        Self::with_binary("docker")
    }

    /// Use a different CLI binary (e.g. `podman`, or a path to `docker`).
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command_string(&self, args: &[&str]) -> String {
        format!("{} {}", self.binary, args.join(" "))
    }

    /// Run a docker command with a timeout, returning raw Output.
    async fn run(&self, args: &[&str], timeout: Duration) -> Result<Output, DockerError> {
        let cmd_str = self.command_string(args);
        tracing::debug!("Running: {}", cmd_str);

        let result = tokio::time::timeout(
            timeout,
            tokio::process::Command::new(&self.binary)
                .args(args)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(DockerError::exec_failed(cmd_str, e)),
            Err(_) => Err(DockerError::timeout(cmd_str, timeout)),
        }
    }

    /// Run a docker command with a timeout, returning Output only if exit 0.
    async fn run_success(&self, args: &[&str], timeout: Duration) -> Result<Output, DockerError> {
        let output = self.run(args, timeout).await?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(DockerError::failed(self.command_string(args), &output))
        }
    }

    /// Run a command with inherited stdio so build progress streams to the
    /// operator's terminal. No timeout: image builds can take a long time.
    async fn run_interactive(&self, program: &str, args: &[&str]) -> Result<(), DockerError> {
        let cmd_str = format!("{} {}", program, args.join(" "));
        tracing::debug!("Running: {}", cmd_str);

        let status = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| DockerError::exec_failed(&cmd_str, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(DockerError::CommandFailed {
                command: cmd_str,
                stderr: "see output above".to_string(),
                exit_code: status.code(),
            })
        }
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build an image with `docker build -t <tag> [-f <dockerfile>] <context>`.
    pub async fn build(
        &self,
        context: &Path,
        dockerfile: Option<&Path>,
        tag: &str,
    ) -> Result<(), DockerError> {
        let context = context.to_string_lossy();
        let dockerfile = dockerfile.map(|p| p.to_string_lossy().into_owned());

        let mut args = vec!["build", "-t", tag];
        if let Some(ref file) = dockerfile {
            args.push("-f");
            args.push(file.as_str());
        }
        args.push(&*context);

        self.run_interactive(&self.binary, &args).await
    }

    /// Build with Docker Compose, preferring the `docker compose` plugin and
    /// falling back to the standalone `docker-compose` binary.
    pub async fn compose_build(
        &self,
        compose_file: &Path,
        service: Option<&str>,
    ) -> Result<(), DockerError> {
        let file = compose_file.to_string_lossy();
        let mut build_args = vec!["-f", &*file, "build"];
        if let Some(service) = service {
            build_args.push(service);
        }

        let plugin_available = matches!(
            self.run(&["compose", "version"], INSPECT_TIMEOUT).await,
            Ok(ref o) if o.status.success()
        );

        if plugin_available {
            let mut args = vec!["compose"];
            args.extend_from_slice(&build_args);
            self.run_interactive(&self.binary, &args).await
        } else {
            tracing::debug!("docker compose plugin unavailable, using docker-compose");
            self.run_interactive("docker-compose", &build_args).await
        }
    }
}

impl Default for DockerClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Arguments for `docker run` realizing `instance`.
pub fn run_args(instance: &ServiceInstance) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "-d".to_string(),
        "--name".to_string(),
        instance.name.clone(),
        "--restart".to_string(),
        instance.restart.as_docker_arg().to_string(),
        "--label".to_string(),
        MANAGED_LABEL.to_string(),
        "-p".to_string(),
        instance.port.publish_arg(),
    ];

    for volume in &instance.volumes {
        args.push("-v".to_string());
        args.push(volume.mount_arg());
    }

    if let Some(env_file) = &instance.env_file {
        args.push("--env-file".to_string());
        args.push(env_file.display().to_string());
    }

    args.push(instance.image.clone());
    args
}

/// Find the container publishing `port` in `docker ps` output formatted as
/// `{{.Names}}\t{{.Ports}}`.
pub fn find_port_publisher(ps_output: &str, port: u16) -> Option<String> {
    let needle = format!(":{}->", port);
    ps_output.lines().find_map(|line| {
        let (name, ports) = line.split_once('\t')?;
        ports.contains(&needle).then(|| name.trim().to_string())
    })
}

#[async_trait]
impl ContainerRuntime for DockerClient {
    async fn ping(&self) -> Result<(), DockerError> {
        match self
            .run(&["info", "--format", "{{.ServerVersion}}"], INSPECT_TIMEOUT)
            .await
        {
            Ok(o) if o.status.success() => Ok(()),
            Ok(o) => Err(DockerError::DaemonUnavailable(Some(
                String::from_utf8_lossy(&o.stderr).trim().to_string(),
            ))),
            Err(DockerError::Timeout { .. }) => Err(DockerError::DaemonUnavailable(Some(
                "docker info timed out".to_string(),
            ))),
            Err(e) => Err(e),
        }
    }

    async fn remove_container(&self, name: &str) -> Result<Removal, DockerError> {
        let output = self.run(&["rm", "-f", name], REMOVE_TIMEOUT).await?;
        if output.status.success() {
            // Newer CLIs exit 0 for a missing container with `-f` but print nothing.
            let removed = !String::from_utf8_lossy(&output.stdout).trim().is_empty();
            return Ok(if removed {
                Removal::Removed
            } else {
                Removal::NotFound
            });
        }
        let err = DockerError::failed(format!("{} rm -f {}", self.binary, name), &output);
        if err.is_not_found() {
            Ok(Removal::NotFound)
        } else {
            Err(err)
        }
    }

    async fn stop_container(&self, name: &str, grace: Duration) -> Result<Removal, DockerError> {
        let grace_secs = grace.as_secs().to_string();
        let output = self
            .run(&["stop", "-t", &grace_secs, name], REMOVE_TIMEOUT + grace)
            .await?;
        if !output.status.success() {
            let err = DockerError::failed(format!("{} stop {}", self.binary, name), &output);
            if err.is_not_found() {
                return Ok(Removal::NotFound);
            }
            if err.is_unavailable() {
                return Err(err);
            }
            tracing::warn!("Graceful stop failed, forcing removal: {}", err);
        }
        self.remove_container(name).await?;
        Ok(Removal::Removed)
    }

    async fn image_exists(&self, image: &str) -> Result<bool, DockerError> {
        let output = self.run(&["image", "inspect", image], INSPECT_TIMEOUT).await?;
        if output.status.success() {
            return Ok(true);
        }
        let err = DockerError::failed(format!("{} image inspect {}", self.binary, image), &output);
        if err.is_unavailable() {
            Err(err)
        } else {
            Ok(false)
        }
    }

    async fn pull_image(&self, image: &str) -> Result<(), DockerError> {
        self.run_success(&["pull", image], PULL_TIMEOUT).await?;
        Ok(())
    }

    async fn create_and_start(&self, instance: &ServiceInstance) -> Result<String, DockerError> {
        let args = run_args(instance);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.run_success(&arg_refs, PULL_TIMEOUT).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn is_running(&self, name: &str) -> Result<bool, DockerError> {
        let filter = format!("name={}", name);
        let output = self
            .run_success(
                &[
                    "ps",
                    "--filter",
                    &filter,
                    "--filter",
                    "status=running",
                    "--format",
                    "{{.Names}}",
                ],
                INSPECT_TIMEOUT,
            )
            .await?;
        // The name filter is a substring match, so compare exactly.
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .any(|line| line.trim() == name))
    }

    async fn stats(&self, name: &str) -> Result<ResourceSnapshot, DockerError> {
        let cmd = format!("{} stats --no-stream {}", self.binary, name);
        let output = self
            .run_success(
                &["stats", "--no-stream", "--format", "{{json .}}", name],
                INSPECT_TIMEOUT,
            )
            .await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| DockerError::UnexpectedOutput {
                command: cmd.clone(),
                detail: "no stats returned".to_string(),
            })?;
        ResourceSnapshot::from_stats_json(line).map_err(|e| DockerError::UnexpectedOutput {
            command: cmd,
            detail: e.to_string(),
        })
    }

    async fn port_holder(&self, port: u16) -> Result<Option<String>, DockerError> {
        let output = self
            .run_success(&["ps", "--format", "{{.Names}}\t{{.Ports}}"], INSPECT_TIMEOUT)
            .await?;
        Ok(find_port_publisher(
            &String::from_utf8_lossy(&output.stdout),
            port,
        ))
    }
}
