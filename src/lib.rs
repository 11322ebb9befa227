#![allow(unused_assignments)]

//! # sttctl
//!
//! Lifecycle management for the containerized speech-to-text service.
//!
//! ## Features
//!
//! - **Teardown-and-restart**: `start` removes any container of the same name
//!   and creates a fresh one, so repeated runs converge on one container
//! - **Health probing**: structured parsing of the service's `/health` payload
//! - **Status reporting**: running state, health, resource usage and disk usage
//!   of the data directories, each degrading independently
//! - **Setup**: data directory creation and image builds via Compose or Docker
//!
//! ## Quick Start
//!
//! ```no_run
//! use sttctl::{DockerClient, LifecycleManager, Parser};
//!
//! # async fn example() -> Result<(), sttctl::Error> {
//! let config = Parser::new().load_or_default(None, std::path::Path::new("."))?;
//! let instance = config.service_instance()?;
//!
//! let manager = LifecycleManager::new(DockerClient::new());
//! let outcome = manager.start(&instance).await?;
//! println!("started {}", outcome.container_id);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod docker;
pub mod error;
pub mod healthcheck;
pub mod lifecycle;
pub mod port;
pub mod setup;
pub mod status;

pub use config::{Config, Parser, RestartPolicy, ServiceInstance};
pub use docker::{ContainerRuntime, DockerClient, Removal};
pub use error::{Error, Result};
pub use healthcheck::{HealthProbe, HealthReport, HealthStatus, HttpProber};
pub use lifecycle::{LifecycleManager, StartOutcome};
pub use status::{StatusReporter, StatusSummary};
