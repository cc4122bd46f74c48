//! Prometheus remote-write pipeline.
//!
//! A push runs mapping, encoding, compression and transport to completion:
//!
//! ```text
//! [MetricFamily] -> map_families -> [Series] -> build_write_request
//!     -> encode_request (schema) -> compress (snappy) -> Transport::send
//! ```
//!
//! The only suspension points are schema loading and the HTTP request.

pub mod compress;
pub mod encoder;
pub mod labels;
pub mod mapper;
pub mod proto;
pub mod schema;
pub mod transport;

pub use compress::{compress, decompress};
pub use encoder::{build_write_request, encode_request, now_millis};
pub use labels::merge_labels;
pub use mapper::map_families;
pub use schema::{ProtoFileProvider, RemoteWriteV1, Schema, SchemaCache, SchemaProvider};
pub use transport::Transport;

use crate::core::{DeliveryOptions, DeliveryResult, MetricFamily, Result, Series};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Instant;

/// Pushes metric snapshots to a remote-write endpoint.
///
/// Cloning is cheap; clones share the HTTP connection pool and schema cache.
#[derive(Clone)]
pub struct RemoteWriter {
    transport: Transport,
    cache: Arc<SchemaCache>,
    provider: Arc<dyn SchemaProvider>,
}

impl RemoteWriter {
    /// Create a writer using the process-wide schema cache
    pub fn new() -> Result<Self> {
        Ok(Self {
            transport: Transport::new()?,
            cache: SchemaCache::global(),
            provider: Arc::new(ProtoFileProvider),
        })
    }

    /// Use a dedicated schema cache instead of the process-wide one
    pub fn with_schema_cache(mut self, cache: Arc<SchemaCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Use a different schema provider for `proto` paths
    pub fn with_schema_provider(mut self, provider: Arc<dyn SchemaProvider>) -> Self {
        self.provider = provider;
        self
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.transport = Transport::with_client(client);
        self
    }

    /// Map a registry snapshot and push it.
    pub async fn push_metrics(
        &self,
        families: &[MetricFamily],
        options: &DeliveryOptions,
    ) -> Result<DeliveryResult> {
        let series = map_families(families);
        self.push_timeseries(&series, options).await
    }

    /// Push already-mapped series.
    ///
    /// An empty list resolves to `200 OK` without touching the network. The
    /// payload is encoded before the endpoint is checked, so encoding errors
    /// surface even when no URL is configured.
    pub async fn push_timeseries(
        &self,
        series: &[Series],
        options: &DeliveryOptions,
    ) -> Result<DeliveryResult> {
        if series.is_empty() {
            return Ok(DeliveryResult::ok());
        }

        let started = Instant::now();
        let request = build_write_request(series, &options.labels, now_millis());
        let schema = self
            .cache
            .resolve(options.proto.as_deref(), self.provider.as_ref())
            .await?;
        let encoded = encode_request(schema.as_ref(), &request)?;
        let body = Bytes::from(compress(&encoded)?);

        if options.timing {
            let elapsed = started.elapsed();
            transport::with_logger(options, || {
                tracing::info!(
                    bytes = encoded.len(),
                    compressed = body.len(),
                    "Serialized in {} ms",
                    elapsed.as_millis()
                );
            });
        }

        self.transport.send(body, &request, options).await
    }
}

impl std::fmt::Debug for RemoteWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteWriter")
            .field("transport", &self.transport)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
