use super::{health_endpoint, short_id};
use crate::output::UserOutput;
use std::time::Duration;
use sttctl::{
    docker::ContainerRuntime, healthcheck::wait_until_healthy, Config, Error, HttpProber,
    LifecycleManager, Removal,
};

pub async fn run_start<R: ContainerRuntime>(
    manager: &LifecycleManager<R>,
    config: &Config,
    wait: bool,
    wait_timeout: Option<Duration>,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let instance = config.service_instance()?;
    let endpoint = health_endpoint(config)?;

    out.status(&format!(
        "Starting {} ({}) on port {}...",
        instance.name,
        instance.image,
        instance.port.publish_arg()
    ));
    let outcome = manager.start(&instance).await?;

    if outcome.replaced == Removal::Removed {
        out.status("  Replaced the previous container");
    }
    out.success(&format!(
        "{} started (container {})",
        instance.name,
        short_id(&outcome.container_id)
    ));
    out.status(&format!("  API:    http://localhost:{}", instance.port.host));
    out.status(&format!("  Health: {}", endpoint));

    if !wait {
        out.status("The service may take a while to load its models.");
        out.status("Check progress with `sttctl health` or `sttctl status`.");
        return Ok(());
    }

    let max_wait = wait_timeout.unwrap_or(config.health.start_timeout);
    out.progress(&format!(
        "Waiting up to {}s for {} to become healthy...",
        max_wait.as_secs(),
        instance.name
    ));

    let prober = HttpProber::new();
    let token = manager.cancellation_token();
    let result = tokio::select! {
        result = wait_until_healthy(&prober, &instance.name, &endpoint, config.health.timeout, max_wait) => result,
        _ = token.cancelled() => Err(Error::Cancelled(
            "stopped waiting; the container keeps running".to_string(),
        )),
    };

    match result {
        Ok(report) => {
            out.finish_progress(" healthy");
            out.status(&format!(
                "  Active WebSocket connections: {}",
                report.websocket_connections
            ));
            Ok(())
        }
        Err(e) => {
            out.finish_progress(" not healthy");
            Err(e.into())
        }
    }
}
