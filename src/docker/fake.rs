//! In-memory [`ContainerRuntime`] for unit tests.
//!
//! Mimics the Docker behaviors the lifecycle logic depends on: names are
//! unique, `rm -f` of a missing container is not an error, and creating a
//! container whose name is taken fails.

use super::{ContainerRuntime, DockerError, Removal, ResourceSnapshot};
use crate::config::ServiceInstance;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FakeContainer {
    pub image: String,
    pub running: bool,
    pub host_port: u16,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub available: bool,
    pub containers: HashMap<String, FakeContainer>,
    pub local_images: HashSet<String>,
    pub pullable_images: HashSet<String>,
    /// Every runtime call, in order, e.g. `"rm stt-service"`.
    pub calls: Vec<String>,
    pub next_id: u32,
    pub stats_error: bool,
}

#[derive(Debug)]
pub struct FakeRuntime {
    pub state: Mutex<FakeState>,
}

impl FakeRuntime {
    /// A reachable runtime with `images` available locally.
    pub fn with_images(images: &[&str]) -> Self {
        Self {
            state: Mutex::new(FakeState {
                available: true,
                local_images: images.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            }),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
        }
    }

    pub fn insert_container(&self, name: &str, image: &str, running: bool, host_port: u16) {
        self.state.lock().unwrap().containers.insert(
            name.to_string(),
            FakeContainer {
                image: image.to_string(),
                running,
                host_port,
            },
        );
    }

    pub fn running_named(&self, name: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .containers
            .iter()
            .filter(|(n, c)| n.as_str() == name && c.running)
            .count()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn enter(&self, call: String) -> Result<std::sync::MutexGuard<'_, FakeState>, DockerError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.available {
            Ok(state)
        } else {
            Err(DockerError::DaemonUnavailable(Some(
                "Cannot connect to the Docker daemon".to_string(),
            )))
        }
    }
}

fn failed(command: &str, stderr: &str) -> DockerError {
    DockerError::CommandFailed {
        command: command.to_string(),
        stderr: stderr.to_string(),
        exit_code: Some(1),
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn ping(&self) -> Result<(), DockerError> {
        self.enter("ping".to_string()).map(|_| ())
    }

    async fn remove_container(&self, name: &str) -> Result<Removal, DockerError> {
        let mut state = self.enter(format!("rm {}", name))?;
        Ok(match state.containers.remove(name) {
            Some(_) => Removal::Removed,
            None => Removal::NotFound,
        })
    }

    async fn stop_container(&self, name: &str, _grace: Duration) -> Result<Removal, DockerError> {
        let mut state = self.enter(format!("stop {}", name))?;
        Ok(match state.containers.remove(name) {
            Some(_) => Removal::Removed,
            None => Removal::NotFound,
        })
    }

    async fn image_exists(&self, image: &str) -> Result<bool, DockerError> {
        let state = self.enter(format!("image-exists {}", image))?;
        Ok(state.local_images.contains(image))
    }

    async fn pull_image(&self, image: &str) -> Result<(), DockerError> {
        let mut state = self.enter(format!("pull {}", image))?;
        if state.pullable_images.contains(image) {
            state.local_images.insert(image.to_string());
            Ok(())
        } else {
            Err(failed(
                "docker pull",
                &format!("Error response from daemon: pull access denied for {}", image),
            ))
        }
    }

    async fn create_and_start(&self, instance: &ServiceInstance) -> Result<String, DockerError> {
        let mut state = self.enter(format!("run {}", instance.name))?;
        if state.containers.contains_key(&instance.name) {
            return Err(failed(
                "docker run",
                &format!(
                    "Conflict. The container name \"/{}\" is already in use",
                    instance.name
                ),
            ));
        }
        if !state.local_images.contains(&instance.image) {
            return Err(failed(
                "docker run",
                &format!("Unable to find image '{}' locally", instance.image),
            ));
        }
        let port_taken = state
            .containers
            .values()
            .any(|c| c.running && c.host_port == instance.port.host);
        if port_taken {
            return Err(failed(
                "docker run",
                &format!(
                    "Bind for 0.0.0.0:{} failed: port is already allocated",
                    instance.port.host
                ),
            ));
        }

        state.next_id += 1;
        let id = format!("{:012x}", state.next_id);
        state.containers.insert(
            instance.name.clone(),
            FakeContainer {
                image: instance.image.clone(),
                running: true,
                host_port: instance.port.host,
            },
        );
        Ok(id)
    }

    async fn is_running(&self, name: &str) -> Result<bool, DockerError> {
        let state = self.enter(format!("is-running {}", name))?;
        Ok(state.containers.get(name).map(|c| c.running).unwrap_or(false))
    }

    async fn stats(&self, name: &str) -> Result<ResourceSnapshot, DockerError> {
        let state = self.enter(format!("stats {}", name))?;
        if state.stats_error {
            return Err(failed("docker stats", "stats unavailable"));
        }
        match state.containers.get(name) {
            Some(c) if c.running => Ok(ResourceSnapshot {
                cpu_percent: Some(1.5),
                memory_usage_bytes: Some(512 * 1024 * 1024),
                memory_limit_bytes: Some(8 * 1024 * 1024 * 1024),
                memory_percent: Some(6.25),
                net_io: "1kB / 2kB".to_string(),
                block_io: "0B / 0B".to_string(),
                pids: Some(12),
                memory_display: "512MiB / 8GiB".to_string(),
            }),
            _ => Err(DockerError::ContainerNotFound {
                container: name.to_string(),
            }),
        }
    }

    async fn port_holder(&self, port: u16) -> Result<Option<String>, DockerError> {
        let state = self.enter(format!("port-holder {}", port))?;
        Ok(state
            .containers
            .iter()
            .find(|(_, c)| c.running && c.host_port == port)
            .map(|(n, _)| n.clone()))
    }
}
