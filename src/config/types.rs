//! Root configuration structure for `sttctl.yaml`.
//!
//! Every field has a default matching the stock STT deployment, so an empty
//! file (or no file at all) describes a working setup:
//!
//! ```yaml
//! name: stt-service
//! image: stt-service:latest
//! port:
//!   host: 8003
//!   container: 8003
//! env_file: .env
//! restart: unless-stopped
//! data:
//!   root: ./data
//!   mount_root: /app/data
//!   dirs: [stt-models, stt-uploads, stt-transcripts, stt-logs]
//! ```

use super::{
    env_loader, serde_duration, HealthConfig, PortMapping, RestartPolicy, ServiceInstance,
    VolumeBinding,
};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SERVICE_NAME: &str = "stt-service";
pub const DEFAULT_IMAGE: &str = "stt-service:latest";
pub const DEFAULT_PORT: u16 = 8003;
pub const DEFAULT_DATA_DIRS: &[&str] = &["stt-models", "stt-uploads", "stt-transcripts", "stt-logs"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub name: String,
    pub image: String,
    pub port: PortConfig,

    /// Env file passed to the container. When unset, `.env` next to the
    /// config file is used if it exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_file: Option<PathBuf>,

    pub restart: RestartPolicy,
    pub data: DataConfig,
    pub health: HealthConfig,
    pub build: BuildConfig,

    /// Grace period given to `docker stop` before the container is killed.
    #[serde(with = "serde_duration")]
    pub stop_grace_period: Duration,

    /// Directory relative paths are resolved against (the config file's
    /// directory, or the working directory when no file was found).
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVICE_NAME.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            port: PortConfig::default(),
            env_file: None,
            restart: RestartPolicy::default(),
            data: DataConfig::default(),
            health: HealthConfig::default(),
            build: BuildConfig::default(),
            stop_grace_period: Duration::from_secs(10),
            base_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortConfig {
    pub host: u16,
    pub container: u16,
    /// Host interface to publish on; all interfaces when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PORT,
            container: DEFAULT_PORT,
            bind: None,
        }
    }
}

/// Host data directories, each bind-mounted at `<mount_root>/<dir>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    pub root: PathBuf,
    pub mount_root: String,
    pub dirs: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data"),
            mount_root: "/app/data".to_string(),
            dirs: DEFAULT_DATA_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// How `setup` builds the image.
///
/// A compose file takes precedence when it exists; otherwise the image is
/// built directly from `context` with `docker build -t <image>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub compose_file: PathBuf,
    /// Compose service to build; all services when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compose_service: Option<String>,
    pub context: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            compose_file: PathBuf::from("docker-compose.yml"),
            compose_service: None,
            context: PathBuf::from("."),
            dockerfile: None,
        }
    }
}

impl Config {
    /// Resolve a config-relative path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Absolute host paths of the data directories, in declaration order.
    pub fn data_dirs(&self) -> Vec<PathBuf> {
        let root = self.resolve(&self.data.root);
        self.data.dirs.iter().map(|d| root.join(d)).collect()
    }

    /// Health endpoint URL, defaulting to `/health` on the published port.
    pub fn health_url(&self) -> String {
        self.health
            .url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}/health", self.port.host))
    }

    /// Build the container definition the lifecycle manager operates on.
    ///
    /// Fails only when an explicitly configured env file does not exist.
    pub fn service_instance(&self) -> Result<ServiceInstance> {
        let root = self.resolve(&self.data.root);
        let mount_root = self.data.mount_root.trim_end_matches('/');
        let volumes = self
            .data
            .dirs
            .iter()
            .map(|dir| VolumeBinding {
                host_path: root.join(dir),
                container_path: format!("{}/{}", mount_root, dir),
            })
            .collect();

        let env_file = env_loader::resolve_env_file(self.env_file.as_deref(), &self.base_dir)?;

        Ok(ServiceInstance {
            name: self.name.clone(),
            image: self.image.clone(),
            port: PortMapping {
                host_ip: self.port.bind.clone(),
                host: self.port.host,
                container: self.port.container,
            },
            volumes,
            env_file,
            restart: self.restart,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_deployment() {
        let config = Config {
            base_dir: PathBuf::from("/srv/stt"),
            ..Default::default()
        };
        let instance = config.service_instance().unwrap();

        assert_eq!(instance.name, "stt-service");
        assert_eq!(instance.port.publish_arg(), "8003:8003");
        assert_eq!(instance.restart, RestartPolicy::UnlessStopped);
        assert_eq!(
            instance.data_dirs(),
            vec![
                PathBuf::from("/srv/stt/data/stt-models"),
                PathBuf::from("/srv/stt/data/stt-uploads"),
                PathBuf::from("/srv/stt/data/stt-transcripts"),
                PathBuf::from("/srv/stt/data/stt-logs"),
            ]
        );
        assert_eq!(instance.volumes[0].container_path, "/app/data/stt-models");
        assert_eq!(config.health_url(), "http://localhost:8003/health");
    }

    #[test]
    fn test_absolute_data_root_is_not_rebased() {
        let config = Config {
            base_dir: PathBuf::from("/srv/stt"),
            data: DataConfig {
                root: PathBuf::from("/mnt/volumes"),
                mount_root: "/data/".to_string(),
                dirs: vec!["models".to_string()],
            },
            ..Default::default()
        };
        let instance = config.service_instance().unwrap();
        assert_eq!(instance.volumes[0].host_path, PathBuf::from("/mnt/volumes/models"));
        assert_eq!(instance.volumes[0].container_path, "/data/models");
    }

    #[test]
    fn test_health_url_follows_host_port() {
        let config = Config {
            port: PortConfig {
                host: 9100,
                container: 8003,
                bind: None,
            },
            ..Default::default()
        };
        assert_eq!(config.health_url(), "http://localhost:9100/health");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = serde_yaml::from_str::<Config>("nmae: typo\n");
        assert!(result.is_err());
    }
}
