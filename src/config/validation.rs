use crate::config::types::{Config, FetchConfig, ServerConfig};
use crate::ConfigError;
use std::net::SocketAddr;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_server_config(&config.server)?;
    Ok(())
}

/// Validates fetch pipeline configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout-ms must be greater than 0".to_string(),
        ));
    }

    if config.connect_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-ms must be greater than 0".to_string(),
        ));
    }

    if config.max_body_bytes == 0 {
        return Err(ConfigError::Validation(
            "max-body-bytes must be greater than 0".to_string(),
        ));
    }

    if config.max_redirects > 50 {
        return Err(ConfigError::Validation(format!(
            "max-redirects must be <= 50, got {}",
            config.max_redirects
        )));
    }

    validate_user_agent(&config.user_agent)?;

    Ok(())
}

/// The user agent travels as a header value: visible ASCII and spaces only
fn validate_user_agent(user_agent: &str) -> Result<(), ConfigError> {
    if user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if !user_agent.chars().all(|c| c == ' ' || c.is_ascii_graphic()) {
        return Err(ConfigError::Validation(format!(
            "user-agent must contain only printable ASCII characters, got '{}'",
            user_agent
        )));
    }

    Ok(())
}

/// Validates HTTP API configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.listen.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("Invalid listen address '{}': {}", config.listen, e))
    })?;

    if let Some(announce) = &config.announce {
        if announce.trim().is_empty() || announce.contains('/') {
            return Err(ConfigError::Validation(format!(
                "announce must be a host[:port], got '{}'",
                announce
            )));
        }
    }

    if config.default_limit == 0 || config.default_limit > 1000 {
        return Err(ConfigError::Validation(format!(
            "default-limit must be between 1 and 1000, got {}",
            config.default_limit
        )));
    }

    Ok(())
}
