use url::Url;

/// Validate the signaling endpoint
///
/// Must parse as a URL with a `ws` or `wss` scheme and a host.
pub fn validate_server_url(server_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let url = Url::parse(server_url)
        .map_err(|e| format!("Invalid server URL '{server_url}': {e}"))?;

    if !matches!(url.scheme(), "ws" | "wss") {
        return Err(format!(
            "Server URL must use ws:// or wss://, got '{}://'",
            url.scheme()
        )
        .into());
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(format!("Server URL '{server_url}' has no host").into());
    }

    Ok(())
}

/// Validate that both timeouts are non-zero
pub fn validate_timeouts(
    connect_timeout_secs: u64,
    shutdown_timeout_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    if connect_timeout_secs == 0 {
        return Err("connect timeout must be greater than zero".into());
    }
    if shutdown_timeout_ms == 0 {
        return Err("shutdown timeout must be greater than zero".into());
    }
    Ok(())
}
