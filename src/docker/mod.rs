//! Container runtime access.
//!
//! [`ContainerRuntime`] is the seam between the lifecycle/status logic and
//! the container engine. [`DockerClient`] implements it over the `docker` CLI.

pub mod client;
pub mod error;
pub mod stats;

#[cfg(test)]
pub(crate) mod fake;

pub use client::DockerClient;
pub use error::DockerError;
pub use stats::ResourceSnapshot;

use crate::config::ServiceInstance;
use async_trait::async_trait;
use std::time::Duration;

/// Outcome of removing a container by name.
///
/// A missing container is a satisfied precondition, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    NotFound,
}

/// Operations the lifecycle manager and status reporter need from a
/// container engine.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Confirm the engine is reachable.
    async fn ping(&self) -> Result<(), DockerError>;

    /// Force-remove the container called `name`, running or not.
    async fn remove_container(&self, name: &str) -> Result<Removal, DockerError>;

    /// Stop `name` with a grace period, then remove it.
    async fn stop_container(&self, name: &str, grace: Duration) -> Result<Removal, DockerError>;

    /// Whether `image` resolves locally.
    async fn image_exists(&self, image: &str) -> Result<bool, DockerError>;

    async fn pull_image(&self, image: &str) -> Result<(), DockerError>;

    /// Create and start a detached container; returns the container ID.
    async fn create_and_start(&self, instance: &ServiceInstance) -> Result<String, DockerError>;

    /// Whether a container called exactly `name` is in running state.
    async fn is_running(&self, name: &str) -> Result<bool, DockerError>;

    async fn stats(&self, name: &str) -> Result<ResourceSnapshot, DockerError>;

    /// Name of the running container publishing host `port`, if any.
    async fn port_holder(&self, port: u16) -> Result<Option<String>, DockerError>;
}
