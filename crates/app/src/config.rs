//! Client configuration
//!
//! Loaded from `cinema.toml`; the backend URL can be overridden with
//! `CINEMA_API_BASE_URL`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use cinema_core::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const CONFIG_FILE_NAME: &str = "cinema.toml";
pub const BASE_URL_ENV: &str = "CINEMA_API_BASE_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend origin, e.g. `http://localhost:5000`
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Where the session cache lives; platform data dir when unset
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            request_timeout_secs: cinema_net::DEFAULT_TIMEOUT.as_secs(),
            data_dir: None,
        }
    }
}

impl AppConfig {
    /// Resolve configuration: explicit file, else the platform config file
    /// if present, else defaults; then apply the environment override
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match project_dirs() {
                Some(dirs) if dirs.config_dir().join(CONFIG_FILE_NAME).exists() => {
                    Self::from_file(&dirs.config_dir().join(CONFIG_FILE_NAME))?
                }
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_override(std::env::var(BASE_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    fn apply_env_override(&mut self, base_url: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            debug!(url = %url, "Base URL overridden from environment");
            self.api_base_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "api_base_url must start with http:// or https://, got '{}'",
                url
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Directory holding the session cache database
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }

        let dirs = project_dirs().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "cinema", "cinema-client")
}
