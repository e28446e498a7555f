//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with TWITTOR_)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! The database URL and session secret stay in the environment
//! (`DATABASE_URL`, `SECRET_KEY`), not in the config file.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Global application configuration
pub static APP_CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| {
    RwLock::new(AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config file, using defaults: {}", e);
        AppConfig::default()
    }))
});

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub bind_address: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Twittor".to_string(),
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Link preview fetching and caching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Seconds to wait for the remote page before giving up
    pub timeout_secs: u64,
    /// Hours a cached preview stays fresh
    pub cache_hours: i64,
    /// User-Agent sent with every preview request
    pub user_agent: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 3,
            cache_hours: 24,
            user_agent: "TwittorBot/1.0 (+educational)".to_string(),
        }
    }
}

/// Content limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum tweet length in characters
    pub max_tweet_length: usize,
    /// Maximum images attached to one tweet
    pub max_images: usize,
    /// Maximum size of a single image in MB
    pub max_image_size_mb: u64,
    /// Accepted image extensions, lowercase
    pub image_extensions: Vec<String>,
    /// Tweets shown on a tag page
    pub tweets_per_tag_page: u64,
    /// Tweets shown on a search results page
    pub search_results: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_tweet_length: 280,
            max_images: 4,
            max_image_size_mb: 5,
            image_extensions: ["jpg", "jpeg", "png", "gif"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            tweets_per_tag_page: 100,
            search_results: 100,
        }
    }
}

impl LimitsConfig {
    pub fn max_image_size_bytes(&self) -> u64 {
        self.max_image_size_mb * 1024 * 1024
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory uploaded tweet images are written to
    pub local_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            local_path: "./uploads".to_string(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub preview: PreviewConfig,
    pub limits: LimitsConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        let config = Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(File::new(path, FileFormat::Toml).required(false))
            // e.g. TWITTOR_PREVIEW_TIMEOUT_SECS -> preview.timeout_secs
            .add_source(
                Environment::with_prefix("TWITTOR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

/// Initialize application configuration
///
/// Triggers the lazy load and logs the result. Call early in startup.
pub fn init() {
    let config = get_config();
    log::info!(
        "Configuration loaded: site.name = {}, preview.timeout_secs = {}",
        config.site.name,
        config.preview.timeout_secs
    );
}

/// Get the current application configuration
pub fn get_config() -> AppConfig {
    APP_CONFIG.read().map(|c| c.clone()).unwrap_or_default()
}

pub fn site() -> SiteConfig {
    get_config().site
}

pub fn preview() -> PreviewConfig {
    get_config().preview
}

pub fn limits() -> LimitsConfig {
    get_config().limits
}

pub fn storage() -> StorageConfig {
    get_config().storage
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.site.name, "Twittor");
        assert_eq!(config.preview.timeout_secs, 3);
        assert_eq!(config.preview.cache_hours, 24);
        assert_eq!(config.limits.max_tweet_length, 280);
        assert_eq!(config.limits.max_images, 4);
    }

    #[test]
    fn test_max_image_size_bytes() {
        let limits = LimitsConfig::default();
        assert_eq!(limits.max_image_size_bytes(), 5 * 1024 * 1024);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[site]
name = "Test Feed"

[preview]
timeout_secs = 7
user_agent = "TestBot/0.1"

[limits]
max_images = 2
"#
        )
        .unwrap();

        let config = AppConfig::load_from_path(temp_file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.site.name, "Test Feed");
        assert_eq!(config.preview.timeout_secs, 7);
        assert_eq!(config.preview.user_agent, "TestBot/0.1");
        assert_eq!(config.limits.max_images, 2);
        // Defaults should still apply for unspecified values
        assert_eq!(config.preview.cache_hours, 24);
        assert_eq!(config.limits.max_tweet_length, 280);
        assert_eq!(config.limits.image_extensions.len(), 4);
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let config = AppConfig::load_from_path("/nonexistent/config.toml").unwrap();
        assert_eq!(config.site.name, "Twittor");
        assert_eq!(config.preview.user_agent, "TwittorBot/1.0 (+educational)");
    }
}
