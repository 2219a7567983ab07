use std::env;

use super::env::parse_u64_var;
use super::yaml::YamlConfig;
use super::{
    ClientConfig, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_SERVER_URL, DEFAULT_SHUTDOWN_TIMEOUT_MS,
};

/// Merge YAML configuration with environment variables
///
/// Priority order (highest to lowest):
/// 1. YAML configuration values
/// 2. Environment variables
/// 3. Default values
///
/// With `None` this is a plain environment load.
pub fn merge_config(
    yaml_config: Option<YamlConfig>,
) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let yaml = yaml_config.unwrap_or_default();

    // YAML > ENV > Default
    macro_rules! get_value {
        ($env_var:expr, $yaml_value:expr, $default:expr) => {
            $yaml_value
                .or_else(|| env::var($env_var).ok())
                .unwrap_or_else(|| $default.to_string())
        };
    }

    let server_url = get_value!(
        "VEFORM_SERVER_URL",
        yaml.server.as_ref().and_then(|s| s.url.clone()),
        DEFAULT_SERVER_URL
    );

    let connect_timeout_secs = match yaml.server.as_ref().and_then(|s| s.connect_timeout_secs) {
        Some(secs) => secs,
        None => parse_u64_var("VEFORM_CONNECT_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
    };

    let shutdown_timeout_ms = match yaml.session.as_ref().and_then(|s| s.shutdown_timeout_ms) {
        Some(ms) => ms,
        None => parse_u64_var("VEFORM_SHUTDOWN_TIMEOUT_MS")?
            .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_MS),
    };

    Ok(ClientConfig {
        server_url,
        connect_timeout_secs,
        shutdown_timeout_ms,
    })
}
