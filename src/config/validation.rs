use crate::config::types::{
    Config, HarvestConfig, HttpConfig, OutputConfig, RemoteConfig, SourceConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvest_config(&config.harvest)?;
    validate_http_config(&config.http)?;
    validate_source_config(&config.source)?;
    validate_remote_config(&config.remote)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates harvest configuration
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 {
        return Err(ConfigError::Validation(
            "batch_size must be >= 1".to_string(),
        ));
    }

    if config.max_scan < 1 {
        return Err(ConfigError::Validation("max_scan must be >= 1".to_string()));
    }

    if config.comic_workers < 1 || config.comic_workers > 100 {
        return Err(ConfigError::Validation(format!(
            "comic_workers must be between 1 and 100, got {}",
            config.comic_workers
        )));
    }

    if config.chapter_workers < 1 || config.chapter_workers > 100 {
        return Err(ConfigError::Validation(format!(
            "chapter_workers must be between 1 and 100, got {}",
            config.chapter_workers
        )));
    }

    Ok(())
}

/// Validates HTTP and retry configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.backoff_min_ms > config.backoff_max_ms {
        return Err(ConfigError::Validation(format!(
            "backoff_min_ms ({}) must not exceed backoff_max_ms ({})",
            config.backoff_min_ms, config.backoff_max_ms
        )));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates source site configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    match config.site.as_str() {
        "komikindo" | "komikcast" => {}
        other => {
            return Err(ConfigError::Validation(format!(
                "unknown source site '{}', expected 'komikindo' or 'komikcast'",
                other
            )));
        }
    }

    if !config.listing_url.contains("{page}") {
        return Err(ConfigError::Validation(
            "listing_url must contain a {page} placeholder".to_string(),
        ));
    }

    // The pattern must be a parseable URL once the placeholder is filled in
    let probe = config.listing_url.replace("{page}", "1");
    Url::parse(&probe)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid listing_url: {}", e)))?;

    Ok(())
}

/// Validates remote store configuration
fn validate_remote_config(config: &RemoteConfig) -> Result<(), ConfigError> {
    if !config.enabled {
        return Ok(());
    }

    if config.endpoint.is_empty() {
        return Err(ConfigError::Validation(
            "remote.endpoint is required when remote.enabled = true".to_string(),
        ));
    }

    Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid remote.endpoint: {}", e)))?;

    if config.bucket.is_empty() {
        return Err(ConfigError::Validation(
            "remote.bucket is required when remote.enabled = true".to_string(),
        ));
    }

    if config.api_key.is_empty() {
        return Err(ConfigError::Validation(
            "remote.api-key (or KOMITANA_API_KEY) is required when remote.enabled = true"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validates local path configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.catalog_path.is_empty() {
        return Err(ConfigError::Validation(
            "catalog_path cannot be empty".to_string(),
        ));
    }

    if config.results_path.is_empty() {
        return Err(ConfigError::Validation(
            "results_path cannot be empty".to_string(),
        ));
    }

    if config.checkpoint_path.is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint_path cannot be empty".to_string(),
        ));
    }

    if config.store_dir.is_empty() {
        return Err(ConfigError::Validation(
            "store_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
