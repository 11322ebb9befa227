//! Health probing of the service's HTTP endpoint.
//!
//! A probe never fails: network errors, timeouts and malformed payloads are
//! all reported as a [`HealthStatus`], because "couldn't reach it" is itself
//! the answer an operator needs.

mod checker;
mod http;

pub use checker::wait_until_healthy;
pub use http::{parse_health_payload, HttpProber};

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Status values the service uses to say it is fine.
const HEALTHY_STATUSES: &[&str] = &["ok", "healthy", "up", "pass"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum HealthStatus {
    /// The service answered with a healthy status; `reported` is its own
    /// wording (e.g. `"ok"`).
    Healthy { reported: String },
    /// The service answered, but with a failing status, a non-2xx response,
    /// or a payload that could not be understood.
    Unhealthy { reason: String },
    /// No answer: connection refused, DNS failure, or timeout.
    Unreachable { reason: String },
}

impl HealthStatus {
    /// Classify a `status` string reported by the service.
    pub fn from_reported(status: &str) -> Self {
        let normalized = status.trim().to_lowercase();
        if HEALTHY_STATUSES.contains(&normalized.as_str()) {
            HealthStatus::Healthy {
                reported: status.to_string(),
            }
        } else {
            HealthStatus::Unhealthy {
                reason: format!("service reported '{}'", status),
            }
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy { .. } => "healthy",
            HealthStatus::Unhealthy { .. } => "unhealthy",
            HealthStatus::Unreachable { .. } => "unreachable",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy { reported } => write!(f, "healthy ({})", reported),
            HealthStatus::Unhealthy { reason } => write!(f, "unhealthy: {}", reason),
            HealthStatus::Unreachable { reason } => write!(f, "unreachable: {}", reason),
        }
    }
}

/// Result of one probe of the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Active WebSocket sessions; 0 when absent or unreadable.
    pub websocket_connections: u64,
}

impl HealthReport {
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unreachable {
                reason: reason.into(),
            },
            websocket_connections: 0,
        }
    }

    pub fn unhealthy(reason: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy {
                reason: reason.into(),
            },
            websocket_connections: 0,
        }
    }
}

/// Something that can probe a health endpoint.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Issue a single probe. Never errors; failures are encoded in the report.
    async fn probe(&self, endpoint: &Url, timeout: Duration) -> HealthReport;
}
