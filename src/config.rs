// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the intake relay.
//!
//! Every value is read from the environment once at startup and falls back
//! to a hardcoded default when the variable is unset or unparseable.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Configuration for the intake relay service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Interface to bind (default: 0.0.0.0)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Listening port (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Outbound mail configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Bot verification configuration
    #[serde(default)]
    pub bot_check: BotCheckConfig,

    /// Validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Which transport delivers composed notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Relay through an SMTP server
    Smtp,
    /// Write `.eml` files to a directory
    File,
}

/// Outbound mail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_transport")]
    pub transport: TransportKind,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default = "default_smtp_user")]
    pub smtp_user: String,

    #[serde(default = "default_smtp_pass")]
    pub smtp_pass: String,

    /// Upgrade the SMTP session with STARTTLS (default: true)
    #[serde(default = "default_true")]
    pub smtp_tls: bool,

    /// Directory for the file transport (default: ./outbox)
    #[serde(default = "default_file_dir")]
    pub file_dir: String,

    /// Sender address on every notification
    #[serde(default = "default_from")]
    pub from: String,

    /// Operator mailbox that receives every notification
    #[serde(default = "default_to")]
    pub to: String,

    /// Site name printed in the notification footer
    #[serde(default = "default_site_name")]
    pub site_name: String,
}

/// Fixed-window rate limiting per client address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per window (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds (default: 900)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Key on the first X-Forwarded-For address instead of the peer address
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

/// Bot verification configuration. Disabled while `secret` is unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotCheckConfig {
    #[serde(default)]
    pub secret: Option<String>,

    #[serde(default = "default_verify_url")]
    pub verify_url: Url,

    /// Scores must be strictly above this value (default: 0.5)
    #[serde(default = "default_min_score")]
    pub min_score: f64,

    #[serde(default = "default_verify_timeout_secs")]
    pub timeout_secs: u64,
}

/// Validation configuration for submitted forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Largest accepted attachment in bytes (default: 10 MiB)
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,

    /// Accepted attachment MIME types
    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,
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
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_transport() -> TransportKind {
    TransportKind::Smtp
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_user() -> String {
    "your-email@gmail.com".to_string()
}

fn default_smtp_pass() -> String {
    "your-app-password".to_string()
}

fn default_file_dir() -> String {
    "./outbox".to_string()
}

fn default_from() -> String {
    "noreply@jubileeuganda.com".to_string()
}

fn default_to() -> String {
    "george.kaggo@jubileeuganda.com".to_string()
}

fn default_site_name() -> String {
    "Jubilee Health Insurance Landing Page".to_string()
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    15 * 60
}

fn default_verify_url() -> Url {
    Url::parse("https://www.google.com/recaptcha/api/siteverify")
        .expect("static verification URL is valid")
}

fn default_min_score() -> f64 {
    0.5
}

fn default_verify_timeout_secs() -> u64 {
    10
}

fn default_max_file_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_allowed_mime_types() -> Vec<String> {
    ["application/pdf", "image/jpeg", "image/jpg", "image/png"]
        .iter()
        .map(|s| s.to_string())
        .collect()
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
            port: default_port(),
            mail: MailConfig::default(),
            rate_limit: RateLimitConfig::default(),
            bot_check: BotCheckConfig::default(),
            validation: ValidationConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: default_transport(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_user: default_smtp_user(),
            smtp_pass: default_smtp_pass(),
            smtp_tls: default_true(),
            file_dir: default_file_dir(),
            from: default_from(),
            to: default_to(),
            site_name: default_site_name(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            trust_forwarded_for: false,
        }
    }
}

impl Default for BotCheckConfig {
    fn default() -> Self {
        Self {
            secret: None,
            verify_url: default_verify_url(),
            min_score: default_min_score(),
            timeout_secs: default_verify_timeout_secs(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            allowed_mime_types: default_allowed_mime_types(),
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

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let flag = |key: &str| get(key).and_then(|v| parse_bool(&v));

        let defaults = Config::default();

        let smtp_user = get("SMTP_USER");
        let mail = MailConfig {
            transport: match get("MAIL_TRANSPORT").as_deref() {
                Some("file") => TransportKind::File,
                _ => TransportKind::Smtp,
            },
            smtp_host: get("SMTP_HOST").unwrap_or(defaults.mail.smtp_host),
            smtp_port: parse_value(get("SMTP_PORT")).unwrap_or(defaults.mail.smtp_port),
            smtp_tls: flag("SMTP_TLS").unwrap_or(defaults.mail.smtp_tls),
            smtp_pass: get("SMTP_PASS").unwrap_or(defaults.mail.smtp_pass),
            file_dir: get("MAIL_FILE_DIR").unwrap_or(defaults.mail.file_dir),
            from: get("MAIL_FROM")
                .or_else(|| smtp_user.clone())
                .unwrap_or(defaults.mail.from),
            smtp_user: smtp_user.unwrap_or(defaults.mail.smtp_user),
            to: get("MAIL_TO").unwrap_or(defaults.mail.to),
            site_name: get("SITE_NAME").unwrap_or(defaults.mail.site_name),
        };

        Config {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_value(get("PORT")).unwrap_or(defaults.port),
            mail,
            rate_limit: RateLimitConfig {
                max_requests: parse_value(get("RATE_LIMIT_MAX")).unwrap_or(defaults.rate_limit.max_requests),
                window_secs: parse_value(get("RATE_LIMIT_WINDOW_SECS"))
                    .unwrap_or(defaults.rate_limit.window_secs),
                trust_forwarded_for: flag("TRUST_FORWARDED_FOR")
                    .unwrap_or(defaults.rate_limit.trust_forwarded_for),
            },
            bot_check: BotCheckConfig {
                secret: get("RECAPTCHA_SECRET"),
                verify_url: get("RECAPTCHA_VERIFY_URL")
                    .and_then(|v| Url::parse(&v).ok())
                    .unwrap_or(defaults.bot_check.verify_url),
                min_score: parse_value(get("RECAPTCHA_MIN_SCORE")).unwrap_or(defaults.bot_check.min_score),
                timeout_secs: defaults.bot_check.timeout_secs,
            },
            validation: ValidationConfig {
                max_file_bytes: parse_value(get("MAX_FILE_BYTES"))
                    .unwrap_or(defaults.validation.max_file_bytes),
                allowed_mime_types: defaults.validation.allowed_mime_types,
            },
            metrics: MetricsConfig {
                enabled: flag("METRICS_ENABLED").unwrap_or(defaults.metrics.enabled),
                path: defaults.metrics.path,
            },
        }
    }

    /// Socket address string the server binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_value<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.parse().ok())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl BotCheckConfig {
    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
