use crate::config::types::{CacheConfig, Config, PacingConfig, SiteConfig, UserConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_user_config(&config.user)?;
    validate_pacing_config(&config.pacing)?;
    validate_cache_config(&config.cache)?;
    Ok(())
}

/// Validates the judge-site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must be http or https, got '{}'",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(
            "base-url has no host".to_string(),
        ));
    }

    Ok(())
}

/// Validates the account configuration
fn validate_user_config(config: &UserConfig) -> Result<(), ConfigError> {
    if config.username.is_empty() {
        return Err(ConfigError::Validation(
            "username cannot be empty".to_string(),
        ));
    }

    if config.password.is_empty() {
        return Err(ConfigError::Validation(
            "password cannot be empty".to_string(),
        ));
    }

    if config.full_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "full-name cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the pacing configuration
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    if config.enrich_delay_min_ms > config.enrich_delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "enrich-delay-min-ms ({}) must not exceed enrich-delay-max-ms ({})",
            config.enrich_delay_min_ms, config.enrich_delay_max_ms
        )));
    }

    Ok(())
}

/// Validates the cache configuration
fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
