use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable consulted when `remote.api-key` is empty
pub const API_KEY_ENV: &str = "KOMITANA_API_KEY";

/// Loads and parses a configuration file from the given path
///
/// An empty `remote.api-key` is filled from the `KOMITANA_API_KEY`
/// environment variable before validation, so secrets can stay out of the
/// config file.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let mut config: Config = toml::from_str(&content)?;

    // Secrets may come from the environment instead of the file
    if config.remote.api_key.is_empty() {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            config.remote.api_key = key;
        }
    }

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// This is used to detect if the configuration has changed between runs.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::HarvestMode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const VALID_CONFIG: &str = r#"
[harvest]
mode = "batch"
batch-size = 50
max-scan = 200
comic-workers = 2
chapter-workers = 5
comic-delay-ms = 1000
chapter-delay-ms = 500

[http]
request-timeout-secs = 10
max-retries = 3
backoff-min-ms = 2000
backoff-max-ms = 5000
user-agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)"

[source]
site = "komikindo"
listing-url = "https://example.com/daftar-manga/page/{page}/"
max-listing-pages = 0

[remote]
enabled = false

[output]
catalog-path = "./catalog.json"
results-path = "./results.json"
checkpoint-path = "./progress.json"
store-dir = "./store"
"#;

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.harvest.mode, HarvestMode::Batch);
        assert_eq!(config.harvest.batch_size, 50);
        assert_eq!(config.harvest.chapter_workers, 5);
        assert_eq!(config.http.max_retries, 3);
        assert_eq!(config.source.site, "komikindo");
        assert!(!config.remote.enabled);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let content = VALID_CONFIG.replace("comic-workers = 2", "comic-workers = 0");
        let file = create_temp_config(&content);
        let result = load_config(file.path());
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_rescan_mode_parses() {
        let content = VALID_CONFIG.replace("mode = \"batch\"", "mode = \"rescan\"");
        let file = create_temp_config(&content);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.harvest.mode, HarvestMode::Rescan);
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        // Same content should produce same hash
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA-256 produces 64 hex characters
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
