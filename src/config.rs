use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the hosted backend (rows and object storage).
    pub service_url: String,
    pub service_key: String,

    pub openai_api_key: Option<String>,

    #[serde(default = "default_bucket")]
    pub attachments_bucket: String,

    #[serde(default = "default_scratch_path")]
    pub scratch_path: String,
}

fn default_bucket() -> String {
    "memories".to_string()
}

fn default_scratch_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("daybook");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("scratch.json").to_string_lossy().to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: String::new(),
            service_key: String::new(),
            openai_api_key: None,
            attachments_bucket: default_bucket(),
            scratch_path: default_scratch_path(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Err(AppError::Config(format!(
                "Wrote a blank config to {}; fill in service_url and service_key",
                config_path.display()
            )))
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("daybook")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.service_url.is_empty() || self.service_key.is_empty() {
            return Err(AppError::Config(
                "service_url and service_key must be set".to_string(),
            ));
        }
        Ok(())
    }
}
