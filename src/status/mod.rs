//! Point-in-time status of the service.
//!
//! [`StatusReporter::report`] never fails. Each part of the summary is
//! gathered independently and degrades to an explicit "unknown" marker when
//! its source cannot be reached.

mod disk;

pub use disk::{format_bytes, measure, DiskUsage};

use crate::docker::{ContainerRuntime, ResourceSnapshot};
use crate::healthcheck::{HealthProbe, HealthReport};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RunningState {
    Running,
    Stopped,
    Unknown { reason: String },
}

impl RunningState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunningState::Running)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirUsage {
    pub path: PathBuf,
    pub usage: DiskUsage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSummary {
    pub name: String,
    pub running: RunningState,
    /// Present only when the container is running.
    pub health: Option<HealthReport>,
    /// Present only when the container is running and stats were readable.
    pub resources: Option<ResourceSnapshot>,
    /// One entry per data directory, in the order given.
    pub disk_usage: Vec<DirUsage>,
}

pub struct StatusReporter<'a, R: ContainerRuntime + ?Sized, P: HealthProbe + ?Sized> {
    runtime: &'a R,
    prober: &'a P,
    probe_timeout: Duration,
}

impl<'a, R: ContainerRuntime + ?Sized, P: HealthProbe + ?Sized> StatusReporter<'a, R, P> {
    pub fn new(runtime: &'a R, prober: &'a P, probe_timeout: Duration) -> Self {
        Self {
            runtime,
            prober,
            probe_timeout,
        }
    }

    pub async fn report(
        &self,
        instance_name: &str,
        endpoint: &Url,
        data_dirs: &[PathBuf],
    ) -> StatusSummary {
        let running = match self.runtime.is_running(instance_name).await {
            Ok(true) => RunningState::Running,
            Ok(false) => RunningState::Stopped,
            Err(e) => {
                tracing::warn!("Could not query container state: {}", e);
                RunningState::Unknown { reason: e.summary() }
            }
        };

        let (health, resources) = if running.is_running() {
            let health = self.prober.probe(endpoint, self.probe_timeout).await;
            let resources = match self.runtime.stats(instance_name).await {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    tracing::warn!("Could not read resource stats: {}", e);
                    None
                }
            };
            (Some(health), resources)
        } else {
            (None, None)
        };

        let disk_usage = measure_all(data_dirs.to_vec()).await;

        StatusSummary {
            name: instance_name.to_string(),
            running,
            health,
            resources,
            disk_usage,
        }
    }
}

async fn measure_all(dirs: Vec<PathBuf>) -> Vec<DirUsage> {
    let fallback = dirs.clone();
    let measured = tokio::task::spawn_blocking(move || {
        dirs.into_iter()
            .map(|path| {
                let usage = measure(&path);
                DirUsage { path, usage }
            })
            .collect::<Vec<_>>()
    })
    .await;

    match measured {
        Ok(usages) => usages,
        Err(e) => {
            tracing::warn!("Disk usage scan aborted: {}", e);
            fallback
                .into_iter()
                .map(|path| DirUsage {
                    path,
                    usage: DiskUsage::Unknown("scan aborted".to_string()),
                })
                .collect()
        }
    }
}
