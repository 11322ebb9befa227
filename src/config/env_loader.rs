//! Env file handling for the service container.
//!
//! The file is handed to `docker run --env-file` untouched; it is parsed here
//! only so that a malformed file fails `start` before the old container is
//! torn down.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_ENV_FILE: &str = ".env";

/// Pick the env file for the container.
///
/// An explicitly configured file must exist. Without one, `.env` in
/// `base_dir` is used when present.
pub fn resolve_env_file(configured: Option<&Path>, base_dir: &Path) -> Result<Option<PathBuf>> {
    match configured {
        Some(path) => {
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                base_dir.join(path)
            };
            if !path.is_file() {
                return Err(Error::Config(format!(
                    "Environment file not found: {}",
                    path.display()
                )));
            }
            Ok(Some(path))
        }
        None => {
            let fallback = base_dir.join(DEFAULT_ENV_FILE);
            Ok(fallback.is_file().then_some(fallback))
        }
    }
}

/// Load environment variables from an env file.
///
/// Uses dotenvy for parsing (KEY=VALUE, comments, quoted values). Every key is
/// checked with [`validate_env_name`].
pub fn load_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let iter = dotenvy::from_path_iter(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read environment file {}: {}",
            path.display(),
            e
        ))
    })?;

    let mut env_vars = HashMap::new();
    for item in iter {
        let (key, value) = item.map_err(|e| {
            Error::Config(format!(
                "Failed to parse environment file {}: {}",
                path.display(),
                e
            ))
        })?;
        validate_env_name(&key)?;
        env_vars.insert(key, value);
    }

    tracing::debug!(
        "Loaded {} variables from {}",
        env_vars.len(),
        path.display()
    );
    Ok(env_vars)
}

/// Validate an environment variable name.
///
/// Names must start with a letter or underscore and contain only ASCII
/// alphanumerics and underscores.
pub fn validate_env_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(Error::Config(
            "Environment variable name cannot be empty".to_string(),
        ));
    };

    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(Error::Config(format!(
            "Invalid environment variable name '{}': must start with a letter or underscore",
            name
        )));
    }

    if let Some((i, c)) = name
        .chars()
        .enumerate()
        .find(|(_, c)| !c.is_ascii_alphanumeric() && *c != '_')
    {
        return Err(Error::Config(format!(
            "Invalid environment variable name '{}': character '{}' at position {} is not allowed",
            name, c, i
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = resolve_env_file(Some(Path::new("secrets.env")), dir.path());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_resolve_explicit_relative_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("secrets.env"), "HF_TOKEN=abc\n").unwrap();
        let resolved = resolve_env_file(Some(Path::new("secrets.env")), dir.path()).unwrap();
        assert_eq!(resolved, Some(dir.path().join("secrets.env")));
    }

    #[test]
    fn test_resolve_falls_back_to_dotenv_only_when_present() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_env_file(None, dir.path()).unwrap(), None);

        fs::write(dir.path().join(".env"), "A=1\n").unwrap();
        assert_eq!(
            resolve_env_file(None, dir.path()).unwrap(),
            Some(dir.path().join(".env"))
        );
    }

    #[test]
    fn test_load_env_file_parses_quotes_and_comments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "# model settings\nWHISPER_MODEL=large-v3\nDEVICE=\"cuda\"\n\nLANG='en'\n",
        )
        .unwrap();

        let vars = load_env_file(&path).unwrap();
        assert_eq!(vars.len(), 3);
        assert_eq!(vars["WHISPER_MODEL"], "large-v3");
        assert_eq!(vars["DEVICE"], "cuda");
        assert_eq!(vars["LANG"], "en");
    }

    #[test]
    fn test_load_env_file_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "THIS IS NOT AN ENV FILE\n").unwrap();
        assert!(load_env_file(&path).is_err());
    }

    #[test]
    fn test_validate_env_name() {
        assert!(validate_env_name("HF_TOKEN").is_ok());
        assert!(validate_env_name("_PRIVATE").is_ok());
        assert!(validate_env_name("").is_err());
        assert!(validate_env_name("1ABC").is_err());
        assert!(validate_env_name("MY-VAR").is_err());
    }
}
