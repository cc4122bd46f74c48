//! Command-line interface for promwrite.
//!
//! Reads a metric snapshot file and pushes it to a remote-write endpoint,
//! either once or on a fixed interval.

use crate::core::{Config, PushError, Result};
use crate::driver::{self, JsonFileSource, PushDriver};
use crate::remote_write::RemoteWriter;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Push metric snapshots to a Prometheus remote-write endpoint
#[derive(Parser, Debug)]
#[command(name = "promwrite")]
#[command(version, about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Remote-write endpoint URL
    #[arg(long, env = "PROMWRITE_URL")]
    pub url: Option<String>,

    /// JSON metric snapshot to push
    #[arg(short, long, env = "PROMWRITE_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Interval between pushes (e.g. 10s, 1m)
    #[arg(short, long, env = "PROMWRITE_INTERVAL", value_parser = parse_duration)]
    pub interval: Option<Duration>,

    /// Configuration file path (default: ~/.config/promwrite/config.yaml)
    #[arg(short, long, env = "PROMWRITE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Push a single snapshot and exit
    #[arg(long)]
    pub once: bool,

    /// Log request and response details
    #[arg(short, long, env = "PROMWRITE_VERBOSE")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, env = "PROMWRITE_DEBUG")]
    pub debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,

    /// Show version information
    #[arg(short = 'V', long = "show-version")]
    pub version: bool,
}

fn parse_duration(value: &str) -> std::result::Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(value).map_err(|e| e.to_string())
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables
    /// 3. Config file
    /// 4. Defaults (lowest priority)
    pub async fn load_config(&self) -> Result<Config> {
        use crate::core::config::ConfigBuilder;

        let mut builder = ConfigBuilder::new();

        let config_path = if let Some(path) = &self.config {
            path.clone()
        } else {
            let default_path = dirs::config_dir()
                .map(|d| d.join("promwrite").join("config.yaml"))
                .unwrap_or_else(|| PathBuf::from("~/.config/promwrite/config.yaml"));

            if default_path.exists() {
                default_path
            } else {
                return self.build_config_from_args(builder);
            }
        };

        match tokio::fs::read_to_string(&config_path).await {
            Ok(content) => {
                builder = builder.from_yaml(&content)?;
                tracing::info!("Loaded configuration from: {:?}", config_path);
            },
            Err(e) if self.config.is_some() => {
                return Err(PushError::config(format!(
                    "Failed to read config file {:?}: {}",
                    config_path, e
                )));
            },
            Err(_) => {
                tracing::debug!("No config file found at {:?}, using defaults", config_path);
            },
        }

        self.build_config_from_args(builder)
    }

    fn build_config_from_args(&self, mut builder: crate::core::config::ConfigBuilder) -> Result<Config> {
        if let Some(url) = &self.url {
            builder = builder.url(url.clone());
        }
        if let Some(path) = &self.snapshot {
            builder = builder.snapshot(path.clone());
        }
        if let Some(interval) = self.interval {
            builder = builder.interval(interval);
        }
        if self.verbose {
            builder = builder.verbose(true);
        }

        builder.debug(self.debug).build()
    }

    /// Initialize logging from the loaded configuration.
    ///
    /// `RUST_LOG` wins over everything, then `--debug`, then
    /// `PROMWRITE_LOG_LEVEL`, then `logging.level` from the config.
    pub fn init_logging(&self, config: &Config) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_level(config)));

        let json_layer = config
            .logging
            .structured
            .then(|| tracing_subscriber::fmt::layer().json().with_target(true));

        let text_layer = (!config.logging.structured).then(|| {
            if self.once {
                tracing_subscriber::fmt::layer().with_target(false).compact()
            } else {
                // Long-running pushes log with more context
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .compact()
            }
        });

        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .with(text_layer)
            .try_init()
            .map_err(|e| PushError::config(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

fn log_level(config: &Config) -> String {
    if config.debug {
        return "debug".to_string();
    }
    std::env::var("PROMWRITE_LOG_LEVEL")
        .unwrap_or_else(|_| config.logging.level.as_str().to_string())
}

/// Execute promwrite.
pub async fn execute(cli: Cli) -> Result<()> {
    if cli.version {
        println!("promwrite {}", env!("CARGO_PKG_VERSION"));
        println!("Prometheus remote-write pusher");
        return Ok(());
    }

    let config = cli.load_config().await?;
    cli.init_logging(&config)?;

    if cli.check_config {
        config.validate()?;
        println!("Configuration is valid!");
        println!(
            "  Endpoint: {}",
            config.remote_write.url.as_deref().unwrap_or("(none)")
        );
        println!("  Interval: {:?}", config.push.interval);
        println!("  Timeout: {:?}", config.remote_write.timeout);
        println!("  Default labels: {}", config.remote_write.labels.len());
        return Ok(());
    }

    let snapshot = config.push.snapshot.clone().ok_or_else(|| {
        PushError::config("No metric snapshot configured; pass --snapshot or set push.snapshot")
    })?;

    if config.remote_write.url.is_none() {
        tracing::warn!("No remote-write endpoint configured, pushes will report 400");
    }

    let driver = PushDriver::new(
        RemoteWriter::new()?,
        Arc::new(JsonFileSource::new(snapshot)),
        config.remote_write.clone(),
        config.push.interval,
    );

    if cli.once {
        let outcome = driver.push_once().await;
        driver::report(&outcome);
        let result = outcome?;
        println!("{}", result);
        return Ok(());
    }

    tracing::info!(
        "Pushing every {:?} to {}",
        config.push.interval,
        config.remote_write.url.as_deref().unwrap_or("(no endpoint)")
    );

    driver
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Received shutdown signal, stopping...");
        })
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> Cli {
        Cli {
            url: None,
            snapshot: None,
            interval: None,
            config: None,
            once: false,
            verbose: false,
            debug: false,
            check_config: false,
            version: false,
        }
    }

    #[test]
    fn test_cli_overrides_yaml() {
        let builder = crate::core::ConfigBuilder::new()
            .from_yaml(
                r#"
remote_write:
  url: http://file.example.com/api/v1/write
push:
  interval: 30s
"#,
            )
            .unwrap();

        let cli = Cli {
            url: Some("http://cli.example.com/api/v1/write".to_string()),
            interval: Some(Duration::from_secs(5)),
            verbose: true,
            ..cli()
        };

        let config = cli.build_config_from_args(builder).unwrap();

        assert_eq!(
            config.remote_write.url.as_deref(),
            Some("http://cli.example.com/api/v1/write")
        );
        assert_eq!(config.push.interval, Duration::from_secs(5));
        assert!(config.remote_write.verbose);
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "promwrite",
            "--url",
            "http://localhost:9090/api/v1/write",
            "--snapshot",
            "metrics.json",
            "--interval",
            "1m",
            "--once",
        ])
        .unwrap();

        assert_eq!(cli.interval, Some(Duration::from_secs(60)));
        assert_eq!(cli.snapshot, Some(PathBuf::from("metrics.json")));
        assert!(cli.once);
    }

    #[test]
    fn test_log_level_from_config() {
        let config = crate::core::ConfigBuilder::new()
            .from_yaml("logging:\n  level: warn\n  structured: true\n")
            .unwrap()
            .build()
            .unwrap();

        if std::env::var("PROMWRITE_LOG_LEVEL").is_err() {
            assert_eq!(log_level(&config), "warn");
        }

        let config = Cli { debug: true, ..cli() }
            .build_config_from_args(
                crate::core::ConfigBuilder::new()
                    .from_yaml("logging:\n  level: error\n")
                    .unwrap(),
            )
            .unwrap();
        assert_eq!(log_level(&config), "debug");
    }

    #[test]
    fn test_invalid_interval() {
        assert!(Cli::try_parse_from(["promwrite", "--interval", "soon"]).is_err());
    }
}
