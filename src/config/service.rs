use super::RestartPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A fully resolved container definition.
///
/// This is the value every lifecycle operation receives. It is derived from
/// [`Config`](super::Config) with all relative paths resolved, so it can be
/// passed to the runtime as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstance {
    /// Container name; at most one container with this name exists.
    pub name: String,
    /// Image reference, e.g. `stt-service:latest`.
    pub image: String,
    pub port: PortMapping,
    /// Persistent host directories, in mount order.
    pub volumes: Vec<VolumeBinding>,
    /// Env file handed to the container with `--env-file`.
    pub env_file: Option<PathBuf>,
    pub restart: RestartPolicy,
}

impl ServiceInstance {
    /// Host side of every volume binding, in declaration order.
    pub fn data_dirs(&self) -> Vec<PathBuf> {
        self.volumes.iter().map(|v| v.host_path.clone()).collect()
    }
}

/// Published port: `[host_ip:]host:container`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_ip: Option<String>,
    pub host: u16,
    pub container: u16,
}

impl PortMapping {
    /// Argument for `docker run -p`.
    pub fn publish_arg(&self) -> String {
        match &self.host_ip {
            Some(ip) => format!("{}:{}:{}", ip, self.host, self.container),
            None => format!("{}:{}", self.host, self.container),
        }
    }
}

/// Bind mount of a host directory into the container, read/write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeBinding {
    pub host_path: PathBuf,
    pub container_path: String,
}

impl VolumeBinding {
    /// Argument for `docker run -v`.
    pub fn mount_arg(&self) -> String {
        format!("{}:{}", self.host_path.display(), self.container_path)
    }
}
