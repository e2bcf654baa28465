use super::schema::MarkjumpConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./markjump.yaml
    /// 2. ~/.markjump/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<MarkjumpConfig, ConfigError> {
        let local_config = PathBuf::from("./markjump.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".markjump").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(MarkjumpConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<MarkjumpConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        tracing::debug!("Loaded config from {}", path.display());
        let config: MarkjumpConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// `load_from` when a path is given, `load_default` otherwise.
    pub async fn load(path: Option<&Path>) -> Result<MarkjumpConfig, ConfigError> {
        match path {
            Some(p) => Self::load_from(p).await,
            None => Self::load_default().await,
        }
    }
}
