use std::env;

use super::ClientConfig;
use super::merge::merge_config;

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// Also loads a `.env` file if present using dotenvy. Recognized variables:
    /// `VEFORM_SERVER_URL`, `VEFORM_CONNECT_TIMEOUT_SECS`,
    /// `VEFORM_SHUTDOWN_TIMEOUT_MS`. Unset variables fall back to defaults.
    ///
    /// # Errors
    /// Returns an error if a numeric variable does not parse or the result
    /// fails validation.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let _ = dotenvy::dotenv();

        let config = merge_config(None)?;
        config.validate()?;
        Ok(config)
    }
}

/// Read a numeric variable; unset means `None`, malformed is an error
pub(super) fn parse_u64_var(name: &str) -> Result<Option<u64>, Box<dyn std::error::Error>> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| format!("Invalid {name} environment variable: {e}").into()),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn cleanup_env_vars() {
        unsafe {
            env::remove_var("VEFORM_SERVER_URL");
            env::remove_var("VEFORM_CONNECT_TIMEOUT_SECS");
            env::remove_var("VEFORM_SHUTDOWN_TIMEOUT_MS");
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        cleanup_env_vars();

        let config = ClientConfig::from_env().expect("Should load config");
        assert_eq!(config, ClientConfig::default());

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        cleanup_env_vars();

        unsafe {
            env::set_var("VEFORM_SERVER_URL", "wss://forms.example.com/ws");
            env::set_var("VEFORM_CONNECT_TIMEOUT_SECS", "5");
            env::set_var("VEFORM_SHUTDOWN_TIMEOUT_MS", "250");
        }

        let config = ClientConfig::from_env().expect("Should load config");
        assert_eq!(config.server_url, "wss://forms.example.com/ws");
        assert_eq!(config.connect_timeout_secs, 5);
        assert_eq!(config.shutdown_timeout_ms, 250);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_timeout() {
        cleanup_env_vars();

        unsafe {
            env::set_var("VEFORM_CONNECT_TIMEOUT_SECS", "soon");
        }
        let result = ClientConfig::from_env();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("VEFORM_CONNECT_TIMEOUT_SECS")
        );

        unsafe {
            env::set_var("VEFORM_CONNECT_TIMEOUT_SECS", "0");
        }
        assert!(ClientConfig::from_env().is_err());

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_parse_u64_var() {
        cleanup_env_vars();
        assert_eq!(parse_u64_var("VEFORM_SHUTDOWN_TIMEOUT_MS").unwrap(), None);

        unsafe {
            env::set_var("VEFORM_SHUTDOWN_TIMEOUT_MS", " 750 ");
        }
        assert_eq!(
            parse_u64_var("VEFORM_SHUTDOWN_TIMEOUT_MS").unwrap(),
            Some(750)
        );

        cleanup_env_vars();
    }
}
