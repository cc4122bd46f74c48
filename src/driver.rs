//! Periodic push driver.
//!
//! Takes a metric snapshot on every tick and pushes it. Each push runs as
//! its own task, so a slow endpoint can leave several pushes in flight at
//! once; nothing is queued or retried.

use crate::core::{DeliveryOptions, DeliveryResult, MetricFamily, PushError, Result};
use crate::remote_write::RemoteWriter;
use async_trait::async_trait;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Produces the current metric snapshot.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Take a snapshot of all metric families
    async fn snapshot(&self) -> Result<Vec<MetricFamily>>;
}

/// Reads snapshots from a JSON file in the registry export format.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Create a source reading `path` on every snapshot
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MetricSource for JsonFileSource {
    async fn snapshot(&self) -> Result<Vec<MetricFamily>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        serde_json::from_str(&content)
            .map_err(|e| PushError::snapshot(format!("{}: {}", self.path.display(), e)))
    }
}

/// Pushes snapshots from a source on a fixed interval.
#[derive(Clone)]
pub struct PushDriver {
    writer: RemoteWriter,
    source: Arc<dyn MetricSource>,
    options: Arc<DeliveryOptions>,
    interval: Duration,
}

impl PushDriver {
    /// Create a driver
    pub fn new(
        writer: RemoteWriter,
        source: Arc<dyn MetricSource>,
        options: DeliveryOptions,
        interval: Duration,
    ) -> Self {
        Self {
            writer,
            source,
            options: Arc::new(options),
            interval,
        }
    }

    /// Take one snapshot and push it
    pub async fn push_once(&self) -> Result<DeliveryResult> {
        let families = self.source.snapshot().await?;
        self.writer.push_metrics(&families, &self.options).await
    }

    /// Push on every tick until `shutdown` resolves.
    ///
    /// The first push happens one interval after start. Pushes still in
    /// flight at shutdown are left to finish on their own.
    pub async fn run<S>(&self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.spawn_push();
                }
                () = &mut shutdown => {
                    tracing::info!("Push driver stopping");
                    break;
                }
            }
        }
    }

    fn spawn_push(&self) {
        let driver = self.clone();
        tokio::spawn(async move {
            report(&driver.push_once().await);
        });
    }
}

/// Log the outcome of a push.
pub fn report(outcome: &Result<DeliveryResult>) {
    match outcome {
        Ok(result) if result.is_success() => {
            tracing::debug!("Remote write accepted: {}", result);
        },
        Ok(result) => {
            tracing::warn!("Remote write rejected: {}", result);
        },
        Err(e) => {
            tracing::error!(category = e.category(), recoverable = e.is_recoverable(), "Push failed: {}", e);
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"[
        {"name": "custom_counter", "help": "c", "type": "counter",
         "values": [{"value": 2, "labels": {}}], "aggregator": "sum"},
        {"name": "custom_summary", "help": "s", "type": "summary", "aggregator": "sum",
         "values": [
            {"labels": {"quantile": 0.5}, "value": 4.1},
            {"metricName": "custom_summary_count", "labels": {}, "value": 9}
         ]}
    ]"#;

    #[tokio::test]
    async fn test_json_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        std::fs::write(&path, SNAPSHOT).unwrap();

        let families = JsonFileSource::new(&path).snapshot().await.unwrap();

        assert_eq!(families.len(), 2);
        assert_eq!(families[1].kind(), "summary");
    }

    #[tokio::test]
    async fn test_json_file_source_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = JsonFileSource::new(dir.path().join("missing.json"));
        assert!(matches!(missing.snapshot().await, Err(PushError::Io(_))));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        let broken = JsonFileSource::new(&path);
        assert!(matches!(broken.snapshot().await, Err(PushError::Snapshot(_))));
    }

    #[tokio::test]
    async fn test_push_once_without_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        std::fs::write(&path, SNAPSHOT).unwrap();

        let writer = RemoteWriter::new()
            .unwrap()
            .with_schema_cache(Arc::new(crate::remote_write::SchemaCache::new()));
        let driver = PushDriver::new(
            writer,
            Arc::new(JsonFileSource::new(&path)),
            DeliveryOptions::default(),
            Duration::from_secs(10),
        );

        let result = driver.push_once().await.unwrap();
        assert_eq!(result, DeliveryResult::no_endpoint());
    }
}
