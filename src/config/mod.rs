//! Configuration management for Arena Dash
//!
//! Loads defaults, optional config files and environment variables (via .env)

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Base URL of the public arena backend
pub const DEFAULT_API_BASE_URL: &str = "https://g8h3ilc7vokm.manus.space/api";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub refresh: RefreshConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL, every resource path is appended to it
    pub base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Seconds between scheduled refresh cycles
    pub interval_secs: u64,
    /// `limit` query parameter for the detailed trades call
    pub detailed_trades_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    /// Log a text summary per cycle instead of drawing the terminal UI
    pub headless: bool,
    /// Redraw tick in milliseconds (keeps the header clock moving)
    pub tick_rate_ms: u64,
    /// Rows of the detailed trade log shown in the trades tab
    pub detailed_trades_shown: usize,
    /// Trending stocks shown in the trades tab
    pub trending_shown: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log file used while the terminal UI owns stdout
    pub file: String,
    /// Emit JSON lines instead of human readable logs
    pub json: bool,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (ARENA_DASH__*)
            .add_source(Environment::with_prefix("ARENA_DASH").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Built-in defaults only, no files or environment
    pub fn defaults() -> Result<Self> {
        Ok(Self::builder()?.build()?.try_deserialize()?)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let builder = Config::builder()
            // API defaults
            .set_default("api.base_url", DEFAULT_API_BASE_URL)?
            .set_default("api.request_timeout_secs", 10)?
            // Refresh defaults
            .set_default("refresh.interval_secs", 30)?
            .set_default("refresh.detailed_trades_limit", 20)?
            // UI defaults
            .set_default("ui.headless", false)?
            .set_default("ui.tick_rate_ms", 1000)?
            .set_default("ui.detailed_trades_shown", 10)?
            .set_default("ui.trending_shown", 6)?
            // Logging defaults
            .set_default("logging.file", "arena-dash.log")?
            .set_default("logging.json", false)?;
        Ok(builder)
    }

    /// Reject values that would make the refresh loop misbehave
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            bail!("api.base_url must not be empty");
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            bail!("api.base_url must be an http(s) URL, got {}", self.api.base_url);
        }
        if self.refresh.interval_secs == 0 {
            bail!("refresh.interval_secs must be at least 1");
        }
        if self.api.request_timeout_secs == 0 {
            bail!("api.request_timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.ui.tick_rate_ms.max(50))
    }

    /// Generate a digest of the config for logging
    pub fn digest(&self) -> String {
        format!(
            "api={} interval={}s trades_limit={} headless={}",
            self.api.base_url,
            self.refresh.interval_secs,
            self.refresh.detailed_trades_limit,
            self.ui.headless
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
