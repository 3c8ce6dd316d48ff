use crate::config::types::{CatalogSettings, Config, FetchSettings, PoolSettings, StorageSettings};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_pool_settings(&config.pool)?;
    validate_fetch_settings(&config.fetch)?;
    validate_catalog_settings(&config.catalog)?;
    validate_storage_settings(&config.storage)?;
    Ok(())
}

fn validate_pool_settings(settings: &PoolSettings) -> Result<(), ConfigError> {
    if settings.workers < 1 || settings.workers > 1024 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 1024, got {}",
            settings.workers
        )));
    }

    if settings.pop_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "pop-timeout-secs must be >= 1, got {}",
            settings.pop_timeout_secs
        )));
    }

    Ok(())
}

fn validate_fetch_settings(settings: &FetchSettings) -> Result<(), ConfigError> {
    if settings.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            settings.request_timeout_secs
        )));
    }

    if settings.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be >= 1, got {}",
            settings.connect_timeout_secs
        )));
    }

    if settings.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_catalog_settings(settings: &CatalogSettings) -> Result<(), ConfigError> {
    let url = Url::parse(&settings.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("base-url: {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must be http or https, got {}",
            url.scheme()
        )));
    }

    Ok(())
}

fn validate_storage_settings(settings: &StorageSettings) -> Result<(), ConfigError> {
    if settings.records_dir.is_empty() {
        return Err(ConfigError::Validation(
            "records-dir cannot be empty".to_string(),
        ));
    }

    if settings.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
