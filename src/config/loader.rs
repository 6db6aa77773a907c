use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

use super::ExecutorConfig;

/// Looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "spark-executor.toml";

pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::in_dir(PathBuf::from("."))
    }

    /// Loader resolving the default config file against `base_dir`.
    pub fn in_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Load an explicit file, or the default file if present, else defaults.
    ///
    /// Environment overrides are not applied here; see
    /// [`ExecutorConfig::merge_env_vars`].
    pub async fn load(&self, explicit: Option<&Path>) -> Result<ExecutorConfig> {
        if let Some(path) = explicit {
            return Self::read(path).await;
        }

        let default_path = self.base_dir.join(DEFAULT_CONFIG_FILE);
        if fs::try_exists(&default_path).await.unwrap_or(false) {
            return Self::read(&default_path).await;
        }

        tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
        Ok(ExecutorConfig::default())
    }

    async fn read(path: &Path) -> Result<ExecutorConfig> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ExecutorConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
