use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use lazy_static::lazy_static;
use crate::error::WizardError;

/// Environment variable selecting the backend base URL
pub const API_URL_ENV: &str = "ENERGY_WIZARD_API_URL";

/// Backend used when neither the environment nor the config file names one
pub const DEFAULT_API_URL: &str = "https://bkw-hackathon-backend.onrender.com";

const CONFIG_FILE_NAME: &str = "energy-wizard.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// No request deadline unless set
    pub request_timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Config pointing at an explicit base URL, everything else default
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        ApiConfig {
            base_url: base_url.into(),
            ..ApiConfig::default()
        }
    }

    /// Resolve the config from its sources.
    /// The environment value wins over the file, the file wins over the defaults.
    pub fn from_sources(
        env_url: Option<String>,
        file_contents: Option<&str>,
    ) -> Result<Self, WizardError> {
        let mut config = match file_contents {
            Some(content) => toml::from_str::<ApiConfig>(content)?,
            None => ApiConfig::default(),
        };

        if let Some(url) = env_url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            config.base_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Join an endpoint path onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn validate(&self) -> Result<(), WizardError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(WizardError::Config {
                message: "base_url must not be empty".to_string(),
            });
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(WizardError::Config {
                message: format!("base_url must be an http(s) URL, got '{}'", url),
            });
        }
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    // Use platform-specific app data directory
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support/energy-wizard");
            dir.push(CONFIG_FILE_NAME);
            return dir;
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push("energy-wizard");
            dir.push(CONFIG_FILE_NAME);
            return dir;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".config/energy-wizard");
            dir.push(CONFIG_FILE_NAME);
            return dir;
        }
    }

    // Fallback
    PathBuf::from(CONFIG_FILE_NAME)
}

fn load_api_config_internal() -> ApiConfig {
    let config_path = config_path();
    let file_contents = fs::read_to_string(&config_path).ok();
    let env_url = std::env::var(API_URL_ENV).ok();

    match ApiConfig::from_sources(env_url, file_contents.as_deref()) {
        Ok(config) => {
            tracing::debug!(path = ?config_path, base_url = %config.base_url, "Loaded API config");
            config
        }
        Err(e) => {
            tracing::warn!(path = ?config_path, error = %e, "Invalid API config, using defaults");
            ApiConfig::default()
        }
    }
}

lazy_static! {
    static ref API_CONFIG: ApiConfig = load_api_config_internal();
}

/// Get the cached API configuration (resolved once per process)
pub fn get_api_config() -> &'static ApiConfig {
    &API_CONFIG
}
