// SPDX-FileCopyrightText: 2026 CWT Studio
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the form relay service.
//!
//! Every value has a default; the environment only overrides. A missing
//! email API key is not a load error: the service starts and every form
//! endpoint answers 500 until the key is provided.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Configuration for the form relay service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Email relay configuration
    #[serde(default)]
    pub email: EmailConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per identifier per window (default: 10)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds (default: 60)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Table size above which expired entries are swept (default: 1000)
    #[serde(default = "default_sweep_threshold")]
    pub sweep_threshold: usize,
}

/// Payload validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum serialized payload size in bytes (default: 50000)
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,

    /// Maximum raw request body read from the socket (default: 1 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Transactional email provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Provider API key. Form endpoints refuse to run without it.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Provider base URL (default: https://api.resend.com)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Sender address
    #[serde(default = "default_from")]
    pub from: String,

    /// Recipient address for notifications
    #[serde(default = "default_to")]
    pub to: String,

    /// Provider request timeout in seconds (default: 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_requests() -> u32 {
    10
}

fn default_window_secs() -> u64 {
    60
}

fn default_sweep_threshold() -> usize {
    1000
}

fn default_max_payload_bytes() -> usize {
    crate::validator::DEFAULT_MAX_PAYLOAD_BYTES
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_api_base() -> String {
    "https://api.resend.com".to_string()
}

fn default_from() -> String {
    "CWT Studio <noreply@cwtstudio.com>".to_string()
}

fn default_to() -> String {
    "hello@cwtstudio.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            validation: ValidationConfig::default(),
            email: EmailConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            sweep_threshold: default_sweep_threshold(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: default_max_payload_bytes(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            from: default_from(),
            to: default_to(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl EmailConfig {
    /// Get the provider request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from the process environment, reading a `.env`
    /// file first when one exists.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Blank values count as unset; numeric values that fail to parse fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        Config {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            rate_limit: RateLimitConfig {
                max_requests: parsed(get("RATE_LIMIT_MAX_REQUESTS"))
                    .unwrap_or(defaults.rate_limit.max_requests),
                window_secs: parsed(get("RATE_LIMIT_WINDOW_SECS"))
                    .unwrap_or(defaults.rate_limit.window_secs),
                sweep_threshold: parsed(get("RATE_LIMIT_SWEEP_THRESHOLD"))
                    .unwrap_or(defaults.rate_limit.sweep_threshold),
            },
            validation: ValidationConfig {
                max_payload_bytes: parsed(get("MAX_PAYLOAD_BYTES"))
                    .unwrap_or(defaults.validation.max_payload_bytes),
                max_body_bytes: parsed(get("MAX_BODY_BYTES"))
                    .unwrap_or(defaults.validation.max_body_bytes),
            },
            email: EmailConfig {
                api_key: get("RESEND_API_KEY"),
                api_base: get("RESEND_API_BASE").unwrap_or(defaults.email.api_base),
                from: get("EMAIL_FROM").unwrap_or(defaults.email.from),
                to: get("EMAIL_TO").unwrap_or(defaults.email.to),
                timeout_secs: parsed(get("EMAIL_TIMEOUT_SECS")).unwrap_or(defaults.email.timeout_secs),
            },
            metrics: MetricsConfig {
                enabled: get("METRICS_ENABLED")
                    .and_then(|v| parse_trimmed::<bool>(&v.to_lowercase()))
                    .unwrap_or(defaults.metrics.enabled),
                path: get("METRICS_PATH").unwrap_or(defaults.metrics.path),
            },
        }
    }
}

fn parse_trimmed<T: FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

fn parsed<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| parse_trimmed(&v))
}
