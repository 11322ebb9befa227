// Allow unused_assignments at module level because thiserror's generated code
// for struct variants triggers false positive warnings - the fields ARE used
// in the Display impl but rustc's lint pass doesn't see this.
#![allow(unused_assignments)]

use crate::docker::DockerError;
use miette::Diagnostic;
use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    #[diagnostic(
        code(sttctl::config::validation),
        help("Fix the listed fields in sttctl.yaml")
    )]
    Validation(Vec<String>),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Container runtime is unavailable: {0}")]
    #[diagnostic(
        code(sttctl::runtime::unavailable),
        help("Check that Docker is running with `docker ps`")
    )]
    RuntimeUnavailable(String),

    #[error("Image '{image}' could not be resolved{}", .detail.as_ref().map(|d| format!(": {}", d)).unwrap_or_default())]
    #[diagnostic(
        code(sttctl::runtime::image_not_found),
        help("Build the image with `sttctl setup` or check the image reference in sttctl.yaml")
    )]
    ImageNotFound {
        image: String,
        detail: Option<String>,
    },

    #[error("Port {port} is already bound{}", .holder.as_ref().map(|h| format!(" by {}", h)).unwrap_or_default())]
    #[diagnostic(
        code(sttctl::port::conflict),
        help("Find what's using the port with: lsof -i :{port}")
    )]
    BindConflict { port: u16, holder: Option<String> },

    #[error("Docker error: {0}")]
    #[diagnostic(code(sttctl::docker::error))]
    Docker(#[from] DockerError),

    #[error("Service '{service}' did not become healthy within {}s (last status: {last_status})", .waited.as_secs())]
    #[diagnostic(
        code(sttctl::health::timeout),
        help("Check the container logs with `docker logs {service}`")
    )]
    HealthTimeout {
        service: String,
        waited: Duration,
        last_status: String,
    },

    #[error("Image build failed: {0}")]
    #[diagnostic(code(sttctl::setup::build_failed))]
    BuildFailed(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns a helpful suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Error::RuntimeUnavailable(_) => {
                Some("Start the Docker daemon, then re-run `sttctl start`.".to_string())
            }
            Error::ImageNotFound { image, .. } => Some(format!(
                "Build the image with `sttctl setup`, or pull it with `docker pull {}`.",
                image
            )),
            Error::BindConflict { port, holder } => {
                let stop_hint = match holder {
                    Some(h) => format!("Stop {} or change `port.host` in sttctl.yaml.", h),
                    None => "Stop the process holding it or change `port.host` in sttctl.yaml."
                        .to_string(),
                };
                Some(format!("Port {} is already in use. {}", port, stop_hint))
            }
            Error::HealthTimeout { service, .. } => Some(format!(
                "The container may still be loading models. Check `docker logs {}` and `sttctl status`.",
                service
            )),
            Error::Config(_) | Error::Validation(_) | Error::Parse(_) => {
                Some("Check sttctl.yaml and the env file it references.".to_string())
            }
            Error::Docker(_) => Some("Check that Docker is running: docker ps".to_string()),
            Error::BuildFailed(_) => {
                Some("Re-run with -v to see the full build command.".to_string())
            }
            Error::Cancelled(_) => Some(
                "The old container was removed; re-run `sttctl start` to bring the service back."
                    .to_string(),
            ),
            Error::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_conflict_display_with_holder() {
        let err = Error::BindConflict {
            port: 8003,
            holder: Some("process 'python3' (PID 42)".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Port 8003 is already bound by process 'python3' (PID 42)"
        );
    }

    #[test]
    fn test_bind_conflict_display_without_holder() {
        let err = Error::BindConflict {
            port: 8003,
            holder: None,
        };
        assert_eq!(err.to_string(), "Port 8003 is already bound");
    }

    #[test]
    fn test_validation_lists_every_problem() {
        let err = Error::Validation(vec!["name is empty".into(), "image is empty".into()]);
        let msg = err.to_string();
        assert!(msg.contains("  - name is empty"));
        assert!(msg.contains("  - image is empty"));
    }

    #[test]
    fn test_every_fatal_start_error_has_suggestion() {
        let errors = [
            Error::RuntimeUnavailable("no daemon".into()),
            Error::ImageNotFound {
                image: "stt-service:latest".into(),
                detail: None,
            },
            Error::BindConflict {
                port: 8003,
                holder: None,
            },
        ];
        for err in errors {
            assert!(err.suggestion().is_some(), "missing suggestion for {}", err);
        }
    }
}
