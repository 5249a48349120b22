//! Configuration infrastructure
//!
//! Settings are layered with the `config` crate:
//! 1. Built-in defaults (`AppConfig::default()`)
//! 2. Optional JSON file (user config directory or an explicit path)
//! 3. `AFFILISTORE__SECTION__KEY` environment overrides

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub cache: CacheConfig,
    pub catalog: CatalogConfig,
    pub http: HttpConfig,
    pub partner: PartnerConfig,
    pub extraction: ExtractionConfig,
    pub logging: LoggingConfig,
}

/// Deal and search cache lifetimes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of a category deal listing in minutes
    pub deals_ttl_minutes: u64,
    /// Lifetime of a search result page in minutes
    pub search_ttl_minutes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            deals_ttl_minutes: defaults::CACHE_TTL_MINUTES,
            search_ttl_minutes: defaults::CACHE_TTL_MINUTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Items requested per category deal listing
    pub deals_per_category: u32,
    /// Appended to the category name to build the deal query
    pub deals_query_suffix: String,
    /// Highest search page that still reports `hasMore`
    pub max_search_pages: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            deals_per_category: defaults::DEALS_PER_CATEGORY,
            deals_query_suffix: defaults::DEALS_QUERY_SUFFIX.to_string(),
            max_search_pages: defaults::MAX_SEARCH_PAGES,
        }
    }
}

/// Page fetching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub follow_redirects: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: defaults::PAGE_TIMEOUT_SECONDS,
            user_agent: defaults::BROWSER_USER_AGENT.to_string(),
            accept: defaults::BROWSER_ACCEPT.to_string(),
            accept_language: defaults::BROWSER_ACCEPT_LANGUAGE.to_string(),
            follow_redirects: true,
        }
    }
}

/// Affiliate partner conversion API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartnerConfig {
    pub endpoint: String,
    /// Bearer token, normally supplied through `AFFILISTORE__PARTNER__API_TOKEN`
    pub api_token: String,
    pub convert_timeout_seconds: u64,
    pub scrape_timeout_seconds: u64,
}

impl Default for PartnerConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::PARTNER_ENDPOINT.to_string(),
            api_token: String::new(),
            convert_timeout_seconds: defaults::CONVERT_TIMEOUT_SECONDS,
            scrape_timeout_seconds: defaults::SCRAPE_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Replacement for the built-in platform table
    pub platform_table_path: Option<PathBuf>,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,
    /// Enable JSON formatted logs
    pub json_format: bool,
    pub console_output: bool,
    pub file_output: bool,
    /// Directory for log files, defaults to the app data directory
    pub log_dir: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: None,
            file_prefix: "affilistore".to_string(),
        }
    }
}

impl AppConfig {
    pub fn deals_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cache.deals_ttl_minutes.saturating_mul(60))
    }

    pub fn search_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cache.search_ttl_minutes.saturating_mul(60))
    }
}

/// Configuration manager
#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);
        Ok(config_dir)
    }

    /// Get application data directory
    pub fn get_app_data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .context("Failed to get user data directory")?
            .join(defaults::APP_DIR_NAME);
        Ok(data_dir)
    }

    /// Manager for `config.json` in the user config directory
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME)))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    /// Defaults, then the file when present, then environment overrides
    pub fn load_config(&self) -> Result<AppConfig> {
        let base = config::Config::try_from(&AppConfig::default())
            .context("Failed to build default configuration")?;

        let loaded = config::Config::builder()
            .add_source(base)
            .add_source(
                config::File::from(self.config_path.as_path())
                    .format(config::FileFormat::Json)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to load configuration from {:?}", self.config_path))?;

        let config: AppConfig = loaded
            .try_deserialize()
            .context("Configuration has invalid values")?;

        if self.config_path.exists() {
            info!("Loaded configuration from: {:?}", self.config_path);
        } else {
            info!("No configuration file at {:?}, using defaults", self.config_path);
        }
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

pub mod defaults {
    pub const APP_DIR_NAME: &str = "affilistore";

    pub const CONFIG_FILE_NAME: &str = "config.json";

    /// Environment override prefix, e.g. `AFFILISTORE__CACHE__DEALS_TTL_MINUTES`
    pub const ENV_PREFIX: &str = "AFFILISTORE";

    pub const CACHE_TTL_MINUTES: u64 = 60;

    pub const DEALS_PER_CATEGORY: u32 = 20;

    pub const DEALS_QUERY_SUFFIX: &str = "deals offers discount";

    pub const MAX_SEARCH_PAGES: u32 = 10;

    pub const PAGE_TIMEOUT_SECONDS: u64 = 15;

    pub const CONVERT_TIMEOUT_SECONDS: u64 = 10;

    pub const SCRAPE_TIMEOUT_SECONDS: u64 = 15;

    pub const PARTNER_ENDPOINT: &str = "https://ekaro-api.affiliaters.in/api/converter/public";

    /// Retail sites commonly reject library user agents
    pub const BROWSER_USER_AGENT: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    pub const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

    pub const BROWSER_ACCEPT_LANGUAGE: &str = "en-IN,en;q=0.9";
}
