use super::health_endpoint;
use crate::output::UserOutput;
use sttctl::{
    docker::ContainerRuntime,
    status::{format_bytes, DiskUsage, RunningState},
    Config, HttpProber, StatusReporter, StatusSummary,
};

pub async fn run_status<R: ContainerRuntime>(
    runtime: &R,
    config: &Config,
    json: bool,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let endpoint = health_endpoint(config)?;
    let prober = HttpProber::new();

    let summary = StatusReporter::new(runtime, &prober, config.health.timeout)
        .report(&config.name, &endpoint, &config.data_dirs())
        .await;

    if json {
        out.status(&serde_json::to_string_pretty(&summary)?);
    } else {
        render_status(&summary, out);
    }

    Ok(())
}

fn render_status(summary: &StatusSummary, out: &dyn UserOutput) {
    out.status(&format!("Service: {}", summary.name));
    out.status(&format!("{:-<50}", ""));

    let state = match &summary.running {
        RunningState::Running => "+ running".to_string(),
        RunningState::Stopped => "o stopped".to_string(),
        RunningState::Unknown { reason } => format!("? unknown ({})", reason),
    };
    out.status(&format!("  {:<13}{}", "Container:", state));

    if let Some(health) = &summary.health {
        out.status(&format!("  {:<13}{}", "Health:", health.status));
        out.status(&format!(
            "  {:<13}{}",
            "Connections:", health.websocket_connections
        ));
    } else if matches!(summary.running, RunningState::Unknown { .. }) {
        out.status(&format!("  {:<13}unknown", "Health:"));
    }

    if matches!(summary.running, RunningState::Unknown { .. }) {
        out.status(&format!("  {:<13}unknown", "Resources:"));
    } else if summary.running.is_running() {
        match &summary.resources {
            Some(r) => {
                let cpu = r
                    .cpu_percent
                    .map(|c| format!("{:.2}%", c))
                    .unwrap_or_else(|| "unknown".to_string());
                let mem_pct = r
                    .memory_percent
                    .map(|m| format!(" ({:.2}%)", m))
                    .unwrap_or_default();
                out.status(&format!("  {:<13}{}", "CPU:", cpu));
                out.status(&format!("  {:<13}{}{}", "Memory:", r.memory_display, mem_pct));
                out.status(&format!("  {:<13}{}", "Net I/O:", r.net_io));
                out.status(&format!("  {:<13}{}", "Block I/O:", r.block_io));
                if let Some(pids) = r.pids {
                    out.status(&format!("  {:<13}{}", "PIDs:", pids));
                }
            }
            None => out.status(&format!("  {:<13}unavailable", "Resources:")),
        }
    }

    out.blank();
    out.status("Disk usage:");
    if summary.disk_usage.is_empty() {
        out.status("  No data directories configured");
    }
    for dir in &summary.disk_usage {
        let size = match &dir.usage {
            DiskUsage::Bytes(b) => format_bytes(*b),
            DiskUsage::Unknown(reason) => format!("unknown ({})", reason),
        };
        out.status(&format!("  {:<10} {}", size, dir.path.display()));
    }
}
