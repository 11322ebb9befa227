use super::health_endpoint;
use crate::output::UserOutput;
use serde_json::json;
use std::time::Duration;
use sttctl::{Config, HealthProbe, HealthReport, HttpProber};

/// Probe the endpoint once. Returns whether the service is healthy; the
/// caller turns that into the exit code.
pub async fn run_health(
    config: &Config,
    timeout: Option<Duration>,
    json: bool,
    out: &dyn UserOutput,
) -> anyhow::Result<bool> {
    let endpoint = health_endpoint(config)?;
    let timeout = timeout.unwrap_or(config.health.timeout);

    let report = HttpProber::new().probe(&endpoint, timeout).await;

    if json {
        let value = json!({
            "endpoint": endpoint.as_str(),
            "healthy": report.status.is_healthy(),
            "health": report,
        });
        out.status(&serde_json::to_string_pretty(&value)?);
    } else {
        render_health(&report, endpoint.as_str(), out);
    }

    Ok(report.status.is_healthy())
}

fn render_health(report: &HealthReport, endpoint: &str, out: &dyn UserOutput) {
    if report.status.is_healthy() {
        out.success(&format!("{}: {}", endpoint, report.status));
        out.status(&format!(
            "  Active WebSocket connections: {}",
            report.websocket_connections
        ));
    } else {
        out.error(&format!("{}: {}", endpoint, report.status));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::RecordingOutput;
    use sttctl::HealthStatus;

    #[test]
    fn test_render_healthy() {
        let out = RecordingOutput::default();
        let report = HealthReport {
            status: HealthStatus::from_reported("ok"),
            websocket_connections: 3,
        };
        render_health(&report, "http://localhost:8003/health", &out);

        assert_eq!(
            out.lines(),
            vec![
                "http://localhost:8003/health: healthy (ok)".to_string(),
                "  Active WebSocket connections: 3".to_string(),
            ]
        );
    }

    #[test]
    fn test_render_unreachable_omits_connections() {
        let out = RecordingOutput::default();
        render_health(
            &HealthReport::unreachable("connection refused"),
            "http://localhost:8003/health",
            &out,
        );

        assert_eq!(
            out.lines(),
            vec!["error: http://localhost:8003/health: unreachable: connection refused".to_string()]
        );
    }
}
