//! Configuration parsing and types.
//!
//! - `types` - Root config structure (`Config` and its sections)
//! - `service` - The realized container definition (`ServiceInstance`)
//! - `health` - Health probe settings and `RestartPolicy`
//! - `duration` - Human-readable duration strings
//! - `parser` - YAML discovery and loading
//! - `env_loader` - Env file resolution and validation
//! - `validation` - Precondition checks before touching the runtime

pub mod env_loader;

mod duration;
mod health;
mod parser;
mod service;
mod types;
mod validation;

pub use duration::*;
pub use health::*;
pub use parser::*;
pub use service::*;
pub use types::*;
pub use validation::{is_valid_container_name, validate_health_url};
