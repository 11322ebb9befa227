mod config;
mod health;
mod setup;
mod start;
mod status;
mod stop;

pub use config::run_config;
pub use health::run_health;
pub use setup::run_setup;
pub use start::run_start;
pub use status::run_status;
pub use stop::run_stop;

use sttctl::{config::validate_health_url, Config, Error};
use url::Url;

/// The health endpoint from config, parsed.
fn health_endpoint(config: &Config) -> Result<Url, Error> {
    validate_health_url(&config.health_url()).map_err(Error::Config)
}

/// First 12 characters, as `docker ps` shows container IDs.
fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("3f2a9c81d0e4b5a6c7d8"), "3f2a9c81d0e4");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_health_endpoint_defaults_to_host_port() {
        let mut config = Config::default();
        config.port.host = 9100;
        assert_eq!(
            health_endpoint(&config).unwrap().as_str(),
            "http://localhost:9100/health"
        );
    }
}
