use crate::config::types::{Config, CrawlerConfig, HttpConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let start = Url::parse(&config.start_url).map_err(|e| {
        ConfigError::Validation(format!("start-url '{}' is not an absolute URL: {}", config.start_url, e))
    })?;

    if start.scheme() != "http" && start.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "start-url must use http or https, got '{}'",
            start.scheme()
        )));
    }

    if config.allowed_domain.is_empty() {
        return Err(ConfigError::Validation(
            "allowed-domain cannot be empty".to_string(),
        ));
    }

    if !config.start_url.starts_with(&config.allowed_domain) {
        return Err(ConfigError::Validation(format!(
            "start-url '{}' is outside allowed-domain '{}' - the seed would be the only page ever fetched",
            config.start_url, config.allowed_domain
        )));
    }

    if config.throttle && config.throttle_low_ms > config.throttle_high_ms {
        return Err(ConfigError::Validation(format!(
            "throttle-low-ms ({}) must be <= throttle-high-ms ({})",
            config.throttle_low_ms, config.throttle_high_ms
        )));
    }

    Ok(())
}

/// Validates HTTP configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.file.is_empty() {
        return Err(ConfigError::Validation(
            "output file name cannot be empty".to_string(),
        ));
    }

    Ok(())
}
