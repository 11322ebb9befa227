//! Precondition checks run before any runtime call.
//!
//! Every problem is collected so the operator sees the full list at once.

use super::{Config, ServiceInstance};
use crate::error::{Error, Result};
use std::collections::HashSet;

impl ServiceInstance {
    /// Check that name, image, port and volume bindings are well formed.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.name.is_empty() {
            problems.push("name is empty".to_string());
        } else if !is_valid_container_name(&self.name) {
            problems.push(format!(
                "name '{}' is not a valid container name (allowed: [a-zA-Z0-9][a-zA-Z0-9_.-]*)",
                self.name
            ));
        }

        if self.image.trim().is_empty() {
            problems.push("image is empty".to_string());
        } else if self.image.chars().any(char::is_whitespace) {
            problems.push(format!("image '{}' contains whitespace", self.image));
        }

        if self.port.host == 0 {
            problems.push("port.host must be between 1 and 65535".to_string());
        }
        if self.port.container == 0 {
            problems.push("port.container must be between 1 and 65535".to_string());
        }
        if let Some(ip) = &self.port.host_ip {
            if ip.parse::<std::net::IpAddr>().is_err() {
                problems.push(format!("port.bind '{}' is not an IP address", ip));
            }
        }

        if self.volumes.is_empty() {
            problems.push("at least one data directory must be configured".to_string());
        }
        let mut seen = HashSet::new();
        for volume in &self.volumes {
            let host = volume.host_path.to_string_lossy();
            if host.is_empty() || !volume.host_path.is_absolute() {
                problems.push(format!(
                    "volume host path '{}' must be absolute",
                    volume.host_path.display()
                ));
            }
            if host.contains(':') {
                problems.push(format!("volume host path '{}' contains ':'", host));
            }
            if !volume.container_path.starts_with('/') || volume.container_path.len() < 2 {
                problems.push(format!(
                    "volume container path '{}' must be an absolute path below /",
                    volume.container_path
                ));
            }
            if volume.container_path.contains(':') {
                problems.push(format!(
                    "volume container path '{}' contains ':'",
                    volume.container_path
                ));
            }
            if !seen.insert(volume.container_path.as_str()) {
                problems.push(format!(
                    "volume container path '{}' is mounted twice",
                    volume.container_path
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(problems))
        }
    }
}

impl Config {
    /// Validate settings that are not part of the container definition.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if let Err(msg) = validate_health_url(&self.health_url()) {
            problems.push(msg);
        }
        if self.health.timeout.is_zero() {
            problems.push("health.timeout must be greater than zero".to_string());
        }
        if self.data.dirs.iter().any(|d| d.is_empty() || d.contains('/')) {
            problems.push("data.dirs entries must be plain directory names".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(problems))
        }
    }
}

/// Docker container names must match `[a-zA-Z0-9][a-zA-Z0-9_.-]*`.
pub fn is_valid_container_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
}

/// Validate that a URL is well-formed and uses HTTP/HTTPS scheme.
pub fn validate_health_url(url: &str) -> std::result::Result<url::Url, String> {
    let parsed =
        url::Url::parse(url).map_err(|e| format!("health url '{}' is invalid: {}", url, e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(format!(
            "health url '{}': scheme must be http or https, got '{}'",
            url, other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::super::{PortMapping, RestartPolicy, VolumeBinding};
    use super::*;
    use std::path::PathBuf;

    fn instance() -> ServiceInstance {
        ServiceInstance {
            name: "stt-service".to_string(),
            image: "stt-service:latest".to_string(),
            port: PortMapping {
                host_ip: None,
                host: 8003,
                container: 8003,
            },
            volumes: vec![VolumeBinding {
                host_path: PathBuf::from("/srv/stt/data/stt-models"),
                container_path: "/app/data/stt-models".to_string(),
            }],
            env_file: None,
            restart: RestartPolicy::UnlessStopped,
        }
    }

    #[test]
    fn test_valid_instance() {
        assert!(instance().validate().is_ok());
    }

    #[test]
    fn test_collects_all_problems() {
        let mut bad = instance();
        bad.name = String::new();
        bad.image = " ".to_string();
        bad.port.host = 0;
        bad.volumes.clear();

        match bad.validate() {
            Err(Error::Validation(problems)) => assert_eq!(problems.len(), 4),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_relative_host_path_rejected() {
        let mut bad = instance();
        bad.volumes[0].host_path = PathBuf::from("data/stt-models");
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_duplicate_container_path_rejected() {
        let mut bad = instance();
        let dup = bad.volumes[0].clone();
        bad.volumes.push(dup);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_bind_must_be_ip() {
        let mut bad = instance();
        bad.port.host_ip = Some("localhost".to_string());
        assert!(bad.validate().is_err());
        bad.port.host_ip = Some("127.0.0.1".to_string());
        assert!(bad.validate().is_ok());
    }

    #[test]
    fn test_container_name_rules() {
        assert!(is_valid_container_name("stt-service"));
        assert!(is_valid_container_name("stt.service_2"));
        assert!(!is_valid_container_name("-stt"));
        assert!(!is_valid_container_name("stt service"));
    }

    #[test]
    fn test_health_url_scheme() {
        assert!(validate_health_url("http://localhost:8003/health").is_ok());
        assert!(validate_health_url("https://stt.internal/health").is_ok());
        assert!(validate_health_url("ftp://localhost/health").is_err());
        assert!(validate_health_url("not-a-url").is_err());
    }

    #[test]
    fn test_config_rejects_nested_data_dir() {
        let mut config = Config::default();
        config.data.dirs.push("a/b".to_string());
        assert!(config.validate().is_err());
    }
}
