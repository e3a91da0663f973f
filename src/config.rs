use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which page fetching backend the scraper uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Plain HTTP GET through reqwest
    #[default]
    Http,
    /// A WebDriver session, for pages rendered by JavaScript
    WebDriver,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP surface listens on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Page fetching backend
    #[serde(default)]
    pub backend: Backend,

    /// Base timeout for one scrape in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// User agent sent by the HTTP backend
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Directory scraped results are written to (persistence is off when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            backend: Backend::default(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            webdriver_url: default_webdriver_url(),
            output_dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Override the WebDriver URL with the `WEBDRIVER_URL` environment variable if provided
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                ::log::debug!("Using WEBDRIVER_URL from environment: {}", webdriver_url);
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Default value for bind_addr
fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

/// Default value for timeout_ms
fn default_timeout_ms() -> u64 {
    30_000
}

/// Default value for user_agent
fn default_user_agent() -> String {
    format!("scrape-view/{}", env!("CARGO_PKG_VERSION"))
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.backend, Backend::Http);
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert!(config.output_dir.is_none());
    }

    #[test]
    fn test_partial_config() {
        let config =
            AppConfig::from_json(r#"{"backend": "webdriver", "output_dir": "/tmp/out"}"#).unwrap();
        assert_eq!(config.backend, Backend::WebDriver);
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = AppConfig::from_json(r#"{"timeout_ms": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = AppConfig::from_json(r#"{"backend": "ftp"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"bind_addr": "0.0.0.0:8080", "timeout_ms": 500}}"#).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.timeout_ms, 500);

        assert!(matches!(
            AppConfig::from_file("/nonexistent/scrape-view.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
