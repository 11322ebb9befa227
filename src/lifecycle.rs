//! Teardown-and-restart of the service container.
//!
//! [`LifecycleManager::start`] is the single entry point for bringing the
//! service up. It is stateless between invocations: everything it needs is in
//! the [`ServiceInstance`] it receives, and re-running it always converges on
//! exactly one container with that name.
//!
//! Order of operations:
//!
//! 1. validate the instance (and parse its env file)
//! 2. ping the runtime
//! 3. resolve the image, pulling it if it is not present locally
//! 4. remove any container with the same name
//! 5. check the host port
//! 6. create and start the new container
//!
//! The image is resolved before the old container is torn down, so a missing
//! image leaves a running service untouched.

use crate::config::{env_loader, ServiceInstance};
use crate::docker::{ContainerRuntime, DockerError, Removal};
use crate::error::{Error, Result};
use crate::port::PortConflict;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// What a successful [`LifecycleManager::start`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOutcome {
    pub container_id: String,
    /// Whether a previous container of the same name was removed.
    pub replaced: Removal,
}

pub struct LifecycleManager<R: ContainerRuntime> {
    runtime: R,
    cancellation_token: CancellationToken,
    /// Probe the host port before `docker run`. Off when the daemon is remote
    /// and local ports say nothing about the daemon's host.
    check_host_port: bool,
}

impl<R: ContainerRuntime> LifecycleManager<R> {
    pub fn new(runtime: R) -> Self {
        Self {
            runtime,
            cancellation_token: CancellationToken::new(),
            check_host_port: true,
        }
    }

    pub fn with_host_port_check(mut self, enabled: bool) -> Self {
        self.check_host_port = enabled;
        self
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Token that interrupts an in-progress `start` before container creation.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    pub fn cancel_operations(&self) {
        self.cancellation_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    /// Tear down any existing container named `instance.name` and start a
    /// fresh one.
    ///
    /// Fails with `RuntimeUnavailable` before touching any container when the
    /// engine cannot be reached. Once `docker run` has been issued it is
    /// allowed to finish even if cancellation is requested.
    pub async fn start(&self, instance: &ServiceInstance) -> Result<StartOutcome> {
        instance.validate()?;
        if let Some(env_file) = &instance.env_file {
            env_loader::load_env_file(env_file)?;
        }

        self.runtime.ping().await.map_err(|e| {
            tracing::debug!("Runtime ping failed: {}", e);
            Error::RuntimeUnavailable(e.summary())
        })?;

        self.ensure_image(&instance.image).await?;
        self.check_cancelled("image resolved, old container untouched")?;

        let replaced = self
            .runtime
            .remove_container(&instance.name)
            .await
            .map_err(runtime_error)?;
        match replaced {
            Removal::Removed => tracing::info!("Removed existing container '{}'", instance.name),
            Removal::NotFound => tracing::debug!("No existing container '{}'", instance.name),
        }

        if self.check_host_port {
            if let Some(conflict) = PortConflict::check(instance.port.host) {
                let holder = match self.container_on_port(instance.port.host).await {
                    Some(container) => Some(container),
                    None => conflict.describe_holder(),
                };
                return Err(Error::BindConflict {
                    port: instance.port.host,
                    holder,
                });
            }
        }

        self.check_cancelled("old container removed, new container not created")?;

        tracing::info!(
            "Starting '{}' from {} on port {}",
            instance.name,
            instance.image,
            instance.port.publish_arg()
        );
        match self.runtime.create_and_start(instance).await {
            Ok(container_id) => Ok(StartOutcome {
                container_id,
                replaced,
            }),
            Err(e) if e.is_port_conflict() => Err(Error::BindConflict {
                port: instance.port.host,
                holder: self.container_on_port(instance.port.host).await,
            }),
            Err(e) if e.is_missing_image() => Err(Error::ImageNotFound {
                image: instance.image.clone(),
                detail: Some(e.summary()),
            }),
            Err(e) => Err(runtime_error(e)),
        }
    }

    /// Stop and remove the container. An absent container is success.
    pub async fn stop(&self, instance: &ServiceInstance, grace: Duration) -> Result<Removal> {
        let removal = self
            .runtime
            .stop_container(&instance.name, grace)
            .await
            .map_err(runtime_error)?;
        match removal {
            Removal::Removed => tracing::info!("Stopped and removed '{}'", instance.name),
            Removal::NotFound => tracing::info!("'{}' was not running", instance.name),
        }
        Ok(removal)
    }

    async fn ensure_image(&self, image: &str) -> Result<()> {
        if self.runtime.image_exists(image).await.map_err(runtime_error)? {
            tracing::debug!("Image {} present locally", image);
            return Ok(());
        }

        tracing::info!("Image {} not found locally, pulling", image);
        self.runtime.pull_image(image).await.map_err(|e| {
            // An interrupted pull fails because the child got the same SIGINT.
            if self.cancellation_token.is_cancelled() {
                Error::Cancelled("image pull interrupted, old container untouched".to_string())
            } else if e.is_unavailable() {
                Error::RuntimeUnavailable(e.summary())
            } else {
                Error::ImageNotFound {
                    image: image.to_string(),
                    detail: Some(e.summary()),
                }
            }
        })?;

        if self.runtime.image_exists(image).await.map_err(runtime_error)? {
            Ok(())
        } else {
            Err(Error::ImageNotFound {
                image: image.to_string(),
                detail: Some("pull completed but the image still does not resolve".to_string()),
            })
        }
    }

    async fn container_on_port(&self, port: u16) -> Option<String> {
        match self.runtime.port_holder(port).await {
            Ok(holder) => holder.map(|name| format!("container '{}'", name)),
            Err(e) => {
                tracing::debug!("Could not list containers publishing {}: {}", port, e);
                None
            }
        }
    }

    fn check_cancelled(&self, state: &str) -> Result<()> {
        if self.cancellation_token.is_cancelled() {
            return Err(Error::Cancelled(state.to_string()));
        }
        Ok(())
    }
}

fn runtime_error(e: DockerError) -> Error {
    if e.is_unavailable() {
        Error::RuntimeUnavailable(e.summary())
    } else {
        Error::Docker(e)
    }
}
