//! Configuration management for promwrite.
//!
//! This module provides configuration handling with:
//! - YAML file support
//! - Environment variable and CLI overrides (applied by the CLI)
//! - Validation and defaults

use crate::core::{PushError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Complete configuration for promwrite
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote-write delivery options
    pub remote_write: DeliveryOptions,
    /// Push schedule
    pub push: PushConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
}

/// Per-push delivery options for a remote-write endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryOptions {
    /// Remote-write endpoint, e.g. `http://localhost:9090/api/v1/write`
    pub url: Option<String>,
    /// Default labels merged into every series
    pub labels: BTreeMap<String, String>,
    /// Basic auth credentials
    pub auth: AuthConfig,
    /// Extra static request headers
    pub headers: BTreeMap<String, String>,
    /// Upper bound for a single HTTP request
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Alternate `.proto` schema declaring `prometheus.WriteRequest`
    pub proto: Option<PathBuf>,
    /// Log request and response details
    pub verbose: bool,
    /// Log serialization and transport latency
    pub timing: bool,
    /// Logger override; the global subscriber is used when unset
    #[serde(skip)]
    pub logger: Option<tracing::Dispatch>,
}

/// Basic auth credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Username
    pub username: Option<String>,
    /// Password
    pub password: Option<String>,
}

/// Push schedule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// Interval between pushes
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Path of the JSON metric snapshot to push
    pub snapshot: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Structured logging format
    pub structured: bool,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        DeliveryOptions {
            url: None,
            labels: BTreeMap::new(),
            auth: AuthConfig::default(),
            headers: BTreeMap::new(),
            timeout: Duration::from_secs(30),
            proto: None,
            verbose: false,
            timing: false,
            logger: None,
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        PushConfig {
            interval: Duration::from_secs(10),
            snapshot: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            structured: false,
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Result<Self> {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.remote_write.validate()?;

        if self.push.interval.is_zero() {
            return Err(PushError::config("push interval must be greater than 0"));
        }

        Ok(())
    }
}

impl DeliveryOptions {
    /// Create options targeting the given endpoint
    pub fn new(url: impl Into<String>) -> Self {
        DeliveryOptions {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Validate the options.
    ///
    /// A missing URL is accepted here; pushes without one report a 400
    /// result instead of failing.
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.url {
            let parsed = reqwest::Url::parse(url)
                .map_err(|e| PushError::config(format!("Invalid endpoint URL '{}': {}", url, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(PushError::config(format!(
                    "Endpoint URL must use http or https, got '{}'",
                    parsed.scheme()
                )));
            }
        }

        if self.timeout.is_zero() {
            return Err(PushError::config("timeout must be greater than 0"));
        }

        for (name, value) in &self.headers {
            reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| PushError::config(format!("Invalid header name '{}': {}", name, e)))?;
            reqwest::header::HeaderValue::from_str(value).map_err(|e| {
                PushError::config(format!("Invalid value for header '{}': {}", name, e))
            })?;
        }

        Ok(())
    }

    /// Basic auth credentials, only when both parts are set and non-empty
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        match (self.auth.username.as_deref(), self.auth.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }

    /// Set a default label
    pub fn with_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(name.into(), value.into());
        self
    }

    /// Set an extra request header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set basic auth credentials
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = AuthConfig {
            username: Some(username.into()),
            password: Some(password.into()),
        };
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the alternate schema path
    pub fn with_proto(mut self, proto: impl Into<PathBuf>) -> Self {
        self.proto = Some(proto.into());
        self
    }

    /// Route this push's log output to a specific subscriber
    pub fn with_logger(mut self, dispatch: tracing::Dispatch) -> Self {
        self.logger = Some(dispatch);
        self
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| PushError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Set the endpoint URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.remote_write.url = Some(url.into());
        self
    }

    /// Set the push interval
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.push.interval = interval;
        self
    }

    /// Set the snapshot path
    pub fn snapshot(mut self, path: PathBuf) -> Self {
        self.config.push.snapshot = Some(path);
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.remote_write.timeout = timeout;
        self
    }

    /// Enable verbose request logging
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.remote_write.verbose = verbose;
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
