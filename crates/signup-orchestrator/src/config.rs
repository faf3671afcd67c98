//! Configuration for the signup service.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Bot verification configuration
    #[serde(default)]
    pub recaptcha: RecaptchaConfig,

    /// Signup storage configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Notification email configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecaptchaConfig {
    /// Server secret. Without it every token is rejected.
    #[serde(default)]
    pub secret: Option<String>,

    /// Siteverify endpoint
    #[serde(default = "default_verify_url")]
    pub verify_url: String,

    /// Action the token must have been minted for
    #[serde(default = "default_expected_action")]
    pub expected_action: String,

    /// Minimum accepted score
    #[serde(default = "default_min_score")]
    pub min_score: f64,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgrest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Which backend to use
    #[serde(default = "default_store_backend")]
    pub backend: StoreBackend,

    /// Project URL for the PostgREST backend
    #[serde(default)]
    pub url: Option<String>,

    /// Service role key for the PostgREST backend
    #[serde(default)]
    pub service_key: Option<String>,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Dispatch endpoint URL
    #[serde(default = "default_mail_endpoint")]
    pub endpoint: String,

    /// Bearer key for the dispatch endpoint
    #[serde(default)]
    pub api_key: Option<String>,

    /// Admin inbox for signup alerts
    #[serde(default = "default_admin_to")]
    pub admin_to: String,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Global requests per minute
    #[serde(default = "default_global_rpm")]
    pub global_per_minute: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for RecaptchaConfig {
    fn default() -> Self {
        Self {
            secret: None,
            verify_url: default_verify_url(),
            expected_action: default_expected_action(),
            min_score: default_min_score(),
            timeout: default_timeout(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            url: None,
            service_key: None,
            timeout: default_timeout(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            endpoint: default_mail_endpoint(),
            api_key: None,
            admin_to: default_admin_to(),
            timeout: default_timeout(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_per_minute: default_global_rpm(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8080
}

fn default_verify_url() -> String {
    recaptcha_client::DEFAULT_VERIFY_URL.into()
}

fn default_expected_action() -> String {
    recaptcha_client::DEFAULT_EXPECTED_ACTION.into()
}

fn default_min_score() -> f64 {
    recaptcha_client::DEFAULT_MIN_SCORE
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::Memory
}

fn default_mail_endpoint() -> String {
    "http://localhost:54321/functions/v1/send-marketing-email".into()
}

fn default_admin_to() -> String {
    "info@hyper-m.online".into()
}

fn default_global_rpm() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Check cross-field requirements serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.store.backend == StoreBackend::Postgrest {
            if self.store.url.as_deref().unwrap_or_default().is_empty() {
                anyhow::bail!("STORE__URL is required for the postgrest backend");
            }
            if self.store.service_key.as_deref().unwrap_or_default().is_empty() {
                anyhow::bail!("STORE__SERVICE_KEY is required for the postgrest backend");
            }
        }

        if !(0.0..=1.0).contains(&self.recaptcha.min_score) {
            anyhow::bail!("RECAPTCHA__MIN_SCORE must be between 0 and 1");
        }

        Ok(())
    }
}
