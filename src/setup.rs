//! First-time preparation: data directories and the service image.

use crate::config::Config;
use crate::docker::DockerClient;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// How the image will be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildMethod {
    Compose {
        file: PathBuf,
        service: Option<String>,
    },
    Dockerfile {
        context: PathBuf,
        dockerfile: Option<PathBuf>,
        tag: String,
    },
}

impl BuildMethod {
    /// Compose when the configured compose file exists, a plain
    /// `docker build` of the context otherwise.
    pub fn for_config(config: &Config) -> Self {
        let compose_file = config.resolve(&config.build.compose_file);
        if compose_file.is_file() {
            BuildMethod::Compose {
                file: compose_file,
                service: config.build.compose_service.clone(),
            }
        } else {
            BuildMethod::Dockerfile {
                context: config.resolve(&config.build.context),
                dockerfile: config.build.dockerfile.as_deref().map(|p| config.resolve(p)),
                tag: config.image.clone(),
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            BuildMethod::Compose { file, service } => match service {
                Some(s) => format!("docker compose -f {} build {}", file.display(), s),
                None => format!("docker compose -f {} build", file.display()),
            },
            BuildMethod::Dockerfile { context, tag, .. } => {
                format!("docker build -t {} {}", tag, context.display())
            }
        }
    }
}

/// Create every data directory. Returns the ones that did not exist yet.
pub fn create_data_dirs(dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();
    for dir in dirs {
        if dir.is_dir() {
            continue;
        }
        fs::create_dir_all(dir).map_err(|e| {
            Error::Config(format!("Cannot create data directory {}: {}", dir.display(), e))
        })?;
        tracing::info!("Created {}", dir.display());
        created.push(dir.clone());
    }
    Ok(created)
}

/// Build the image with output streamed to the terminal.
pub async fn build_image(client: &DockerClient, method: &BuildMethod) -> Result<()> {
    let result = match method {
        BuildMethod::Compose { file, service } => {
            client.compose_build(file, service.as_deref()).await
        }
        BuildMethod::Dockerfile {
            context,
            dockerfile,
            tag,
        } => {
            if !context.is_dir() {
                return Err(Error::BuildFailed(format!(
                    "build context {} does not exist",
                    context.display()
                )));
            }
            client.build(context, dockerfile.as_deref(), tag).await
        }
    };

    result.map_err(|e| {
        if e.is_unavailable() {
            Error::RuntimeUnavailable(e.summary())
        } else {
            Error::BuildFailed(format!("{}: {}", method.describe(), e))
        }
    })
}

pub fn has_env_file(base_dir: &Path) -> bool {
    base_dir.join(".env").is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        Config {
            base_dir: dir.path().to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_creates_missing_dirs_only() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let dirs = config.data_dirs();
        fs::create_dir_all(&dirs[0]).unwrap();

        let created = create_data_dirs(&dirs).unwrap();

        assert_eq!(created, dirs[1..].to_vec());
        assert!(dirs.iter().all(|d| d.is_dir()));
        assert!(create_data_dirs(&dirs).unwrap().is_empty());
    }

    #[test]
    fn test_compose_file_takes_precedence() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("docker-compose.yml"), "services: {}\n").unwrap();
        let config = config_in(&dir);

        assert_eq!(
            BuildMethod::for_config(&config),
            BuildMethod::Compose {
                file: dir.path().join("docker-compose.yml"),
                service: None,
            }
        );
    }

    #[test]
    fn test_falls_back_to_docker_build() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        match BuildMethod::for_config(&config) {
            BuildMethod::Dockerfile { context, tag, .. } => {
                assert_eq!(context, dir.path().join("."));
                assert_eq!(tag, "stt-service:latest");
            }
            other => panic!("expected Dockerfile build, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_context_fails_before_docker() {
        let dir = TempDir::new().unwrap();
        let method = BuildMethod::Dockerfile {
            context: dir.path().join("missing"),
            dockerfile: None,
            tag: "stt-service:latest".to_string(),
        };
        let client = DockerClient::with_binary("/nonexistent/docker");

        let err = build_image(&client, &method).await.unwrap_err();
        assert!(matches!(err, Error::BuildFailed(_)));
    }
}
