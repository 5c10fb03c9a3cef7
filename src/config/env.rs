//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variables consulted by [`crate::models::Config::merge_from_env`]
pub const ENV_KEYS: &[&str] = &[
    "CONNSTAT_COUNT",
    "CONNSTAT_URL",
    "CONNSTAT_TRACE_DIR",
    "CONNSTAT_HEADER_POLICY",
    "CONNSTAT_TIMEOUT",
];

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the current directory if it exists.
    ///
    /// Returns whether a file was loaded.
    pub fn load_env_file() -> Result<bool> {
        Self::load_env_file_from(Path::new(".env"))
    }

    /// Load a specific env file if it exists; variables already set win
    pub fn load_env_file_from(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }

        dotenv::from_path(path).map_err(|e| {
            AppError::argument_parsing(format!(
                "Failed to load env file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_env_file_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = EnvManager::load_env_file_from(&temp_dir.path().join(".env")).unwrap();
        assert!(!loaded);
    }

    #[test]
    fn test_env_file_loaded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".env");
        fs::write(&path, "CONNSTAT_ENV_TEST_ONLY=loaded\n").unwrap();

        let loaded = EnvManager::load_env_file_from(&path).unwrap();
        assert!(loaded);
        assert_eq!(std::env::var("CONNSTAT_ENV_TEST_ONLY").unwrap(), "loaded");
        std::env::remove_var("CONNSTAT_ENV_TEST_ONLY");
    }

    #[test]
    fn test_env_keys_are_prefixed() {
        assert!(ENV_KEYS.iter().all(|key| key.starts_with("CONNSTAT_")));
    }
}
