use super::Config;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAMES: &[&str] = &["sttctl.yaml", "sttctl.yml"];

pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Find config file starting from current directory
    pub fn find_config_file(&self) -> Result<PathBuf> {
        let current_dir = std::env::current_dir()?;
        Self::find_config_in_dir(&current_dir)
    }

    pub fn find_config_in_dir(dir: &Path) -> Result<PathBuf> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        if let Some(parent) = dir.parent() {
            return Self::find_config_in_dir(parent);
        }

        Err(Error::Config(
            "Could not find sttctl.yaml in current directory or any parent".to_string(),
        ))
    }

    /// Load config from file path. Relative paths inside the file resolve
    /// against the file's directory.
    pub fn load_config<P: AsRef<Path>>(&self, path: P) -> Result<Config> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut config = self.parse_config(&content)?;
        config.base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir()?,
        };
        Ok(config)
    }

    /// Load the explicit file if given, otherwise the nearest `sttctl.yaml`,
    /// otherwise built-in defaults rooted at `work_dir`.
    pub fn load_or_default(&self, explicit: Option<&Path>, work_dir: &Path) -> Result<Config> {
        if let Some(path) = explicit {
            return self.load_config(path);
        }
        match Self::find_config_in_dir(work_dir) {
            Ok(path) => {
                tracing::debug!("Using config file {}", path.display());
                self.load_config(path)
            }
            Err(_) => {
                tracing::debug!(
                    "No sttctl.yaml found, using defaults in {}",
                    work_dir.display()
                );
                Ok(Config {
                    base_dir: work_dir.to_path_buf(),
                    ..Default::default()
                })
            }
        }
    }

    /// Parse config from YAML string. An empty document yields defaults.
    pub fn parse_config(&self, content: &str) -> Result<Config> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| Error::Parse(format!("Failed to parse YAML config: {}", e)))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
