use super::{HealthProbe, HealthReport};
use crate::error::{Error, Result};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use url::Url;

const INITIAL_DELAY: Duration = Duration::from_millis(500);
const MAX_DELAY: Duration = Duration::from_secs(5);

/// Poll `endpoint` until it reports healthy or `max_wait` elapses.
///
/// Starts at 500ms between probes and doubles each attempt up to 5s. The last
/// report is carried in the timeout error so the operator can see why.
pub async fn wait_until_healthy<P: HealthProbe + ?Sized>(
    prober: &P,
    service: &str,
    endpoint: &Url,
    probe_timeout: Duration,
    max_wait: Duration,
) -> Result<HealthReport> {
    let started = Instant::now();
    let mut delay = INITIAL_DELAY;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let report = prober.probe(endpoint, probe_timeout).await;
        if report.status.is_healthy() {
            tracing::info!(
                "'{}' healthy after {} probe(s) ({:?})",
                service,
                attempt,
                started.elapsed()
            );
            return Ok(report);
        }

        let elapsed = started.elapsed();
        if elapsed >= max_wait {
            return Err(Error::HealthTimeout {
                service: service.to_string(),
                waited: elapsed,
                last_status: report.status.to_string(),
            });
        }

        tracing::debug!(
            "'{}' not healthy yet (attempt {}): {}; retrying in {:?}",
            service,
            attempt,
            report.status,
            delay
        );
        sleep(delay.min(max_wait - elapsed)).await;
        delay = (delay * 2).min(MAX_DELAY);
    }
}
