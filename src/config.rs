use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default = "default_session_folder")]
    pub session_folder: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_retry_count")]
    pub retry_count: usize,

    #[serde(default = "default_retry_delay")]
    pub retry_delay_seconds: u64,

    /// Optional user scope forwarded to the dashboard endpoints.
    pub user_id: Option<String>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}
fn default_retry_count() -> usize {
    3
}
fn default_retry_delay() -> u64 {
    10
}
fn default_session_folder() -> String {
    "session".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            retry_count: default_retry_count(),
            retry_delay_seconds: default_retry_delay(),
            user_id: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            session_folder: default_session_folder(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Path::new("config.yml");
        if !path.exists() {
            // Everything has a usable default, so a missing file is fine.
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config.yml")?;
        let config: Config =
            serde_yaml_ng::from_str(&content).context("Failed to parse config.yml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        fs::write("config.yml", content).context("Failed to write config.yml")?;
        Ok(())
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.session_folder)?;
        Ok(())
    }
}
