//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use domain::DEFAULT_UTC_OFFSET_MINUTES;
use integrations::{RemoteSyncConfig, WebhookConfig};
use secrecy::SecretString;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` (default: `"0.0.0.0"`) and `PORT` (default: `3000`)
/// - `RUST_LOG` tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`, `text` or `json` (default: `text`)
/// - `LAUNDRY_DATA_PATH` key-value file (default: `laundry_commercial.json`)
/// - `LAUNDRY_UTC_OFFSET_MINUTES` for `createdAt` (default: `420`)
/// - `WA_REMINDER_API_URL`, `WA_REMINDER_API_KEY`, `OWNER_EMAIL`
/// - `SUPABASE_URL`, `SUPABASE_ANON_KEY`
///
/// Integration settings default to empty, which leaves that integration
/// unconfigured.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub data_path: PathBuf,
    pub utc_offset_minutes: i32,
    pub webhook: WebhookConfig,
    pub remote: RemoteSyncConfig,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str| lookup(key).unwrap_or_default();

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.log_format),
            data_path: lookup("LAUNDRY_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            utc_offset_minutes: lookup("LAUNDRY_UTC_OFFSET_MINUTES")
                .and_then(|m| m.parse().ok())
                .unwrap_or(defaults.utc_offset_minutes),
            webhook: WebhookConfig {
                url: text("WA_REMINDER_API_URL"),
                api_key: SecretString::from(text("WA_REMINDER_API_KEY")),
                owner_email: text("OWNER_EMAIL"),
            },
            remote: RemoteSyncConfig {
                base_url: text("SUPABASE_URL"),
                api_key: SecretString::from(text("SUPABASE_ANON_KEY")),
            },
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            data_path: PathBuf::from("laundry_commercial.json"),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            webhook: WebhookConfig {
                url: String::new(),
                api_key: SecretString::from(String::new()),
                owner_email: String::new(),
            },
            remote: RemoteSyncConfig {
                base_url: String::new(),
                api_key: SecretString::from(String::new()),
            },
        }
    }
}
