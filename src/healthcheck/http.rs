use super::{HealthProbe, HealthReport, HealthStatus};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// HTTP health prober.
///
/// Holds one `reqwest::Client` so repeated probes (e.g. `start --wait`)
/// reuse the connection pool. The per-request timeout overrides the
/// client's fallback timeout.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self { client }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HealthProbe for HttpProber {
    async fn probe(&self, endpoint: &Url, timeout: Duration) -> HealthReport {
        let response = match self
            .client
            .get(endpoint.clone())
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return HealthReport::unreachable(format!(
                    "no response within {}ms",
                    timeout.as_millis()
                ))
            }
            Err(e) => {
                tracing::debug!("Health probe of {} failed: {}", endpoint, e);
                return HealthReport::unreachable(describe_request_error(&e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return HealthReport::unhealthy(format!("HTTP {}", status));
        }

        match response.text().await {
            Ok(body) => parse_health_payload(&body),
            Err(e) if e.is_timeout() => HealthReport::unreachable(format!(
                "response body not received within {}ms",
                timeout.as_millis()
            )),
            Err(e) => HealthReport::unhealthy(format!("failed to read response body: {}", e)),
        }
    }
}

/// reqwest's own message ("error sending request for url ...") hides the
/// cause, so walk the source chain.
fn describe_request_error(e: &reqwest::Error) -> String {
    let mut parts = vec![e.to_string()];
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionRefused {
                return "connection refused".to_string();
            }
        }
        let text = cause.to_string();
        if !parts.iter().any(|p| p.contains(&text)) {
            parts.push(text);
        }
        source = cause.source();
    }
    parts.join(": ")
}

/// Interpret a `/health` response body.
///
/// Expects `{"status": "<string>", "websocket_connections": <integer>}`.
/// A missing or non-string `status` makes the report unhealthy; a missing or
/// non-integer connection count defaults to 0 without affecting status.
pub fn parse_health_payload(body: &str) -> HealthReport {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => return HealthReport::unhealthy(format!("malformed payload: {}", e)),
    };

    let Some(object) = value.as_object() else {
        return HealthReport::unhealthy("malformed payload: expected a JSON object");
    };

    let Some(reported) = object.get("status").and_then(Value::as_str) else {
        return HealthReport::unhealthy("malformed payload: missing string field 'status'");
    };

    HealthReport {
        status: HealthStatus::from_reported(reported),
        websocket_connections: object
            .get("websocket_connections")
            .and_then(Value::as_u64)
            .unwrap_or(0),
    }
}
