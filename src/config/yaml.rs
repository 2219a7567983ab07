use serde::Deserialize;
use std::path::Path;

/// YAML configuration file
///
/// Every field is optional; gaps are filled from the environment and then
/// from defaults.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   url: "wss://forms.example.com/ws"
///   connect_timeout_secs: 10
///
/// session:
///   shutdown_timeout_ms: 500
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub session: Option<SessionYaml>,
}

/// Signaling server settings
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
}

/// Session lifecycle settings
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SessionYaml {
    pub shutdown_timeout_ms: Option<u64>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the YAML is malformed.
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}
