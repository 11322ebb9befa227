use std::time::Duration;
use thiserror::Error;

/// Structured error type for Docker CLI operations.
///
/// Classifies the stderr of failed commands so callers can tell a missing
/// container apart from an unreachable daemon or an occupied port without
/// string matching at every call site.
#[derive(Debug, Error)]
pub enum DockerError {
    /// Docker command timed out.
    #[error("Timed out running '{command}' (exceeded {} seconds)", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    /// Docker command ran but returned non-zero exit.
    #[error("'{command}' failed{}: {stderr}", .exit_code.map(|c| format!(" (exit code {})", c)).unwrap_or_default())]
    CommandFailed {
        command: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    /// Docker binary couldn't be executed (not in PATH, permission denied).
    #[error("Failed to execute '{command}': {source}")]
    ExecFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Container doesn't exist.
    #[error("No such container: {container}")]
    ContainerNotFound { container: String },

    /// Docker daemon not responding.
    #[error("Docker daemon is not responding{}", .0.as_ref().map(|d| format!(": {}", d)).unwrap_or_default())]
    DaemonUnavailable(Option<String>),

    /// Output of a successful command could not be understood.
    #[error("Unexpected output from '{command}': {detail}")]
    UnexpectedOutput { command: String, detail: String },
}

const DAEMON_DOWN_MARKERS: &[&str] = &[
    "Cannot connect to the Docker daemon",
    "Is the docker daemon running",
    "error during connect",
    "permission denied while trying to connect",
];

const MISSING_IMAGE_MARKERS: &[&str] = &[
    "Unable to find image",
    "pull access denied",
    "manifest unknown",
    "repository does not exist",
    "No such image",
    "not found: manifest",
];

const PORT_CONFLICT_MARKERS: &[&str] = &[
    "port is already allocated",
    "address already in use",
    "Bind for",
];

impl DockerError {
    /// Create a timeout error.
    pub fn timeout(cmd: impl Into<String>, dur: Duration) -> Self {
        DockerError::Timeout {
            command: cmd.into(),
            timeout: dur,
        }
    }

    /// Create an error from a failed `std::process::Output`, classifying
    /// daemon-down stderr as [`DockerError::DaemonUnavailable`].
    pub fn failed(cmd: impl Into<String>, output: &std::process::Output) -> Self {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if contains_any(&stderr, DAEMON_DOWN_MARKERS) {
            return DockerError::DaemonUnavailable(Some(stderr));
        }
        DockerError::CommandFailed {
            command: cmd.into(),
            stderr,
            exit_code: output.status.code(),
        }
    }

    /// Create an exec-failed error (binary not found / permission denied).
    pub fn exec_failed(cmd: impl Into<String>, err: std::io::Error) -> Self {
        DockerError::ExecFailed {
            command: cmd.into(),
            source: err,
        }
    }

    /// True when the runtime itself cannot be reached, as opposed to a
    /// command that ran and failed.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DockerError::DaemonUnavailable(_) | DockerError::ExecFailed { .. }
        )
    }

    /// True when the failure means the image reference could not be resolved.
    pub fn is_missing_image(&self) -> bool {
        match self {
            DockerError::CommandFailed { stderr, .. } => {
                contains_any(stderr, MISSING_IMAGE_MARKERS)
            }
            _ => false,
        }
    }

    /// True when `docker run` failed because the host port is taken.
    pub fn is_port_conflict(&self) -> bool {
        match self {
            DockerError::CommandFailed { stderr, .. } => {
                contains_any(stderr, PORT_CONFLICT_MARKERS)
            }
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            DockerError::ContainerNotFound { .. } => true,
            DockerError::CommandFailed { stderr, .. } => stderr.contains("No such container"),
            _ => false,
        }
    }

    /// Short form used in degraded status fields.
    pub fn summary(&self) -> String {
        match self {
            DockerError::DaemonUnavailable(_) => "docker daemon not responding".to_string(),
            DockerError::ExecFailed { .. } => "docker CLI not available".to_string(),
            DockerError::Timeout { timeout, .. } => {
                format!("docker timed out after {}s", timeout.as_secs())
            }
            other => other.to_string(),
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    needles.iter().any(|n| lower.contains(&n.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(stderr: &str) -> DockerError {
        DockerError::CommandFailed {
            command: "docker run".into(),
            stderr: stderr.into(),
            exit_code: Some(125),
        }
    }

    #[test]
    fn test_port_conflict_classification() {
        let err = failed(
            "docker: Error response from daemon: driver failed programming external connectivity \
             on endpoint stt-service: Bind for 0.0.0.0:8003 failed: port is already allocated.",
        );
        assert!(err.is_port_conflict());
        assert!(!err.is_missing_image());
    }

    #[test]
    fn test_missing_image_classification() {
        let err = failed(
            "Unable to find image 'stt-service:latest' locally\n\
             docker: Error response from daemon: pull access denied for stt-service",
        );
        assert!(err.is_missing_image());
        assert!(!err.is_port_conflict());
    }

    #[test]
    fn test_unavailable_classification() {
        assert!(DockerError::DaemonUnavailable(None).is_unavailable());
        let exec = DockerError::exec_failed(
            "docker info",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(exec.is_unavailable());
        assert!(!failed("boom").is_unavailable());
    }

    #[test]
    fn test_not_found_classification() {
        assert!(failed("Error response from daemon: No such container: stt-service").is_not_found());
        assert!(DockerError::ContainerNotFound {
            container: "x".into()
        }
        .is_not_found());
    }

    #[test]
    fn test_command_failed_display_includes_exit_code() {
        assert_eq!(failed("boom").to_string(), "'docker run' failed (exit code 125): boom");
    }
}
