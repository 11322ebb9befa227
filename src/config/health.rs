use super::serde_duration;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Health endpoint settings.
///
/// ```yaml
/// health:
///   url: http://localhost:8003/health
///   timeout: 5s
///   start_timeout: 2m
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthConfig {
    /// Full URL of the health endpoint. Defaults to
    /// `http://localhost:<port.host>/health`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Per-probe timeout.
    #[serde(with = "serde_duration")]
    pub timeout: Duration,

    /// How long `start --wait` polls before giving up.
    #[serde(with = "serde_duration")]
    pub start_timeout: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: Duration::from_secs(5),
            start_timeout: Duration::from_secs(120),
        }
    }
}

/// Container restart policy, passed to `docker run --restart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    /// Never restart
    No,
    /// Always restart, including after daemon restart
    Always,
    /// Restart unless explicitly stopped
    #[default]
    UnlessStopped,
    /// Restart only when the container exits non-zero
    OnFailure,
}

impl RestartPolicy {
    pub fn as_docker_arg(self) -> &'static str {
        match self {
            RestartPolicy::No => "no",
            RestartPolicy::Always => "always",
            RestartPolicy::UnlessStopped => "unless-stopped",
            RestartPolicy::OnFailure => "on-failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restart_policy_parses_kebab_case() {
        let p: RestartPolicy = serde_yaml::from_str("unless-stopped").unwrap();
        assert_eq!(p, RestartPolicy::UnlessStopped);
        let p: RestartPolicy = serde_yaml::from_str("on-failure").unwrap();
        assert_eq!(p.as_docker_arg(), "on-failure");
    }

    #[test]
    fn test_health_defaults() {
        let h = HealthConfig::default();
        assert_eq!(h.timeout, Duration::from_secs(5));
        assert!(h.url.is_none());
    }
}
