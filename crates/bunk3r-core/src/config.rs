use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Bunk3rError, Bunk3rResult};

/// Header carrying the Telegram WebApp init data on every API request
pub const INIT_DATA_HEADER: &str = "X-Telegram-Init-Data";

/// Top-level client configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Bunk3rConfig {
    pub api: ApiConfig,
    pub limits: LimitsConfig,
    pub sms: SmsConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the BUNK3R backend (no trailing slash)
    pub base_url: String,
    /// Path of the publication create endpoint
    pub publish_path: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Refuse plaintext HTTP base URLs instead of warning
    pub enforce_tls: bool,
}

/// Client-side validation limits applied before any encryption work
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum files attached to a single post
    pub max_files: usize,
    /// Maximum size of one image in bytes (default: 10 MiB)
    pub max_image_bytes: u64,
    /// Maximum size of one video in bytes (default: 100 MiB)
    pub max_video_bytes: u64,
}

/// Virtual-number SMS polling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    /// Status endpoint; `{order_id}` is substituted
    pub status_path: String,
    /// First (and minimum) delay between polls
    pub min_delay_ms: u64,
    /// Upper bound for the doubling delay
    pub max_delay_ms: u64,
    /// Give up after this many seconds without an SMS
    pub max_wait_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".into(),
            publish_path: "/api/publications/create".into(),
            timeout_secs: 120,
            enforce_tls: false,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_image_bytes: 10 * 1024 * 1024,
            max_video_bytes: 100 * 1024 * 1024,
        }
    }
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            status_path: "/api/vn/order/{order_id}/sms".into(),
            min_delay_ms: 2_000,
            max_delay_ms: 30_000,
            max_wait_secs: 20 * 60,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl Bunk3rConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Bunk3rResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Bunk3rError::Config(format!("parsing {}: {e}", path.display())))
    }
}

impl ApiConfig {
    /// Join the base URL with an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Check the base URL scheme.
    ///
    /// If `enforce_tls` is true and the URL uses HTTP, this returns an error.
    /// Otherwise, a warning is logged for non-HTTPS URLs.
    pub fn check_transport(&self) -> Bunk3rResult<()> {
        if self.base_url.starts_with("http://") {
            if self.enforce_tls {
                return Err(Bunk3rError::Config(format!(
                    "API base URL uses plaintext HTTP ({}), but enforce_tls is enabled. \
                     Use an HTTPS endpoint or set api.enforce_tls = false for local development.",
                    self.base_url
                )));
            }
            tracing::warn!(
                base_url = %self.base_url,
                "API base URL uses plaintext HTTP; media keys travel in the request body"
            );
        }
        Ok(())
    }
}

/// Expand `~` in path to the user's home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_default();
        PathBuf::from(home).join(rest)
    } else {
        path.to_path_buf()
    }
}
