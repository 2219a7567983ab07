//! Client configuration
//!
//! Settings come from environment variables (and an optional `.env` file) or
//! from a YAML file merged over the environment.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use veform::config::ClientConfig;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Environment only
//! let config = ClientConfig::from_env()?;
//!
//! // YAML file merged over the environment
//! let config = ClientConfig::from_file(Path::new("veform.yaml"))?;
//! println!("Connecting to {}", config.server_url);
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Serialize;

mod env;
mod merge;
mod validation;
mod yaml;

pub use yaml::YamlConfig;

pub const DEFAULT_SERVER_URL: &str = "ws://localhost:8080/ws";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 500;

/// Session client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientConfig {
    /// Signaling endpoint, `ws://` or `wss://`
    pub server_url: String,
    /// Upper bound on opening the signaling channel
    pub connect_timeout_secs: u64,
    /// Upper bound on waiting for the session loop during `stop()`
    pub shutdown_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file with environment fallbacks
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables
    /// 3. Default values
    ///
    /// The `.env` file is not read here; only real environment variables fill
    /// the gaps left by the YAML file.
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the URL scheme and timeouts
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        validation::validate_server_url(&self.server_url)?;
        validation::validate_timeouts(self.connect_timeout_secs, self.shutdown_timeout_ms)?;
        Ok(())
    }

    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn cleanup_env_vars() {
        unsafe {
            std::env::remove_var("VEFORM_SERVER_URL");
            std::env::remove_var("VEFORM_CONNECT_TIMEOUT_SECS");
            std::env::remove_var("VEFORM_SHUTDOWN_TIMEOUT_MS");
        }
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.server_url, "ws://localhost:8080/ws");
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.shutdown_timeout(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_file_merges_env() {
        cleanup_env_vars();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("veform.yaml");
        fs::write(
            &path,
            r#"
server:
  url: "wss://forms.example.com/ws"
"#,
        )
        .unwrap();

        unsafe {
            std::env::set_var("VEFORM_SERVER_URL", "ws://env.example.com/ws");
            std::env::set_var("VEFORM_CONNECT_TIMEOUT_SECS", "3");
        }

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.server_url, "wss://forms.example.com/ws");
        assert_eq!(config.connect_timeout_secs, 3);
        assert_eq!(config.shutdown_timeout_ms, DEFAULT_SHUTDOWN_TIMEOUT_MS);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_rejects_http_url() {
        cleanup_env_vars();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("veform.yaml");
        fs::write(&path, "server:\n  url: \"http://forms.example.com\"\n").unwrap();

        let result = ClientConfig::from_file(&path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("ws://"));
    }

    #[test]
    fn test_from_file_missing() {
        let result = ClientConfig::from_file(Path::new("/nonexistent/veform.yaml"));
        assert!(result.is_err());
    }
}
