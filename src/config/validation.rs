use crate::config::types::{
    CacheConfig, Config, OriginConfig, PipelineConfig, RefreshConfig, ServerConfig,
};
use crate::ConfigError;
use chrono::NaiveTime;
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_origin_config(&config.origin)?;
    validate_cache_config(&config.cache)?;
    validate_pipeline_config(&config.pipeline)?;
    validate_refresh_config(&config.refresh)?;
    Ok(())
}

/// Parses a `HH:MM` time of day
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|e| {
        ConfigError::Validation(format!("daily_at must be HH:MM, got '{}': {}", value, e))
    })
}

fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind_address.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!(
            "Invalid bind_address '{}': {}",
            config.bind_address, e
        ))
    })?;
    Ok(())
}

fn validate_origin_config(config: &OriginConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use HTTP or HTTPS",
            config.base_url
        )));
    }

    if !config.saint_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "saint_path must start with '/', got '{}'",
            config.saint_path
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be between 1 and 300, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.ttl_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "ttl_secs must be >= 1, got {}",
            config.ttl_secs
        )));
    }

    if config.memo_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "memo_capacity must be >= 1, got {}",
            config.memo_capacity
        )));
    }

    Ok(())
}

fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }
    Ok(())
}

fn validate_refresh_config(config: &RefreshConfig) -> Result<(), ConfigError> {
    parse_time_of_day(&config.daily_at)?;
    Ok(())
}
