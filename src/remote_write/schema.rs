//! Write request schemas and the process-wide schema cache.
//!
//! The built-in schema is the Prometheus remote-write v1 `WriteRequest`.
//! An alternate `.proto` file can be supplied through a [`SchemaProvider`];
//! the first schema loaded that way is cached for the rest of the process
//! and reused even when later pushes name a different file.

use crate::core::{PushError, Result, METRIC_NAME_LABEL};
use crate::remote_write::proto::WriteRequest;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use prost::Message;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Fully qualified name of the root message every schema must declare.
pub const WRITE_REQUEST_TYPE: &str = "prometheus.WriteRequest";

/// A message schema able to validate and serialize write requests.
pub trait Schema: Send + Sync + fmt::Debug {
    /// Human readable schema name
    fn name(&self) -> &str;

    /// Check structural conformance, returning a description of the first
    /// violation found.
    fn verify(&self, request: &WriteRequest) -> Option<String>;

    /// Serialize a request
    fn encode(&self, request: &WriteRequest) -> Vec<u8>;

    /// Deserialize a request
    fn decode(&self, bytes: &[u8]) -> Result<WriteRequest>;
}

/// Loads a schema from an external definition.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Load the schema declared at `path`
    async fn load(&self, path: &Path) -> Result<Arc<dyn Schema>>;
}

/// Prometheus remote-write v1 schema.
#[derive(Debug, Clone)]
pub struct RemoteWriteV1 {
    name: String,
}

impl RemoteWriteV1 {
    /// Built-in schema
    pub fn new() -> Self {
        Self {
            name: WRITE_REQUEST_TYPE.to_string(),
        }
    }

    fn with_name(name: String) -> Self {
        Self { name }
    }
}

impl Default for RemoteWriteV1 {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema for RemoteWriteV1 {
    fn name(&self) -> &str {
        &self.name
    }

    fn verify(&self, request: &WriteRequest) -> Option<String> {
        for (i, series) in request.timeseries.iter().enumerate() {
            if series.labels.is_empty() {
                return Some(format!("timeseries.{}.labels: at least one label expected", i));
            }

            for (j, label) in series.labels.iter().enumerate() {
                if label.name.is_empty() {
                    return Some(format!(
                        "timeseries.{}.labels.{}.name: non-empty string expected",
                        i, j
                    ));
                }
            }

            if !series.labels.iter().any(|l| l.name == METRIC_NAME_LABEL) {
                return Some(format!(
                    "timeseries.{}.labels: {} label expected",
                    i, METRIC_NAME_LABEL
                ));
            }
        }
        None
    }

    fn encode(&self, request: &WriteRequest) -> Vec<u8> {
        request.encode_to_vec()
    }

    fn decode(&self, bytes: &[u8]) -> Result<WriteRequest> {
        WriteRequest::decode(bytes)
            .map_err(|e| PushError::encoding(format!("Failed to decode {}: {}", self.name, e)))
    }
}

static PACKAGE_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*package\s+([A-Za-z_][\w.]*)\s*;").expect("valid regex"));

static MESSAGE_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*message\s+([A-Za-z_]\w*)\s*\{").expect("valid regex"));

/// Loads `.proto` files from disk.
///
/// The file must declare `prometheus.WriteRequest`. Its wire layout is
/// taken to be the remote-write v1 layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProtoFileProvider;

impl ProtoFileProvider {
    fn parse(source: &str, path: &Path) -> Result<Arc<dyn Schema>> {
        let package = PACKAGE_DECL
            .captures(source)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or_default();

        let declared = MESSAGE_DECL
            .captures_iter(source)
            .filter_map(|c| c.get(1))
            .any(|m| format!("{}.{}", package, m.as_str()) == WRITE_REQUEST_TYPE);

        if !declared {
            return Err(PushError::schema(format!(
                "no type {} declared in {}",
                WRITE_REQUEST_TYPE,
                path.display()
            )));
        }

        Ok(Arc::new(RemoteWriteV1::with_name(format!(
            "{} ({})",
            WRITE_REQUEST_TYPE,
            path.display()
        ))))
    }
}

#[async_trait]
impl SchemaProvider for ProtoFileProvider {
    async fn load(&self, path: &Path) -> Result<Arc<dyn Schema>> {
        let source = tokio::fs::read_to_string(path).await.map_err(|e| {
            PushError::schema(format!("Failed to read schema {}: {}", path.display(), e))
        })?;
        Self::parse(&source, path)
    }
}

static DEFAULT_SCHEMA: Lazy<Arc<dyn Schema>> = Lazy::new(|| Arc::new(RemoteWriteV1::new()));

static GLOBAL_CACHE: Lazy<Arc<SchemaCache>> = Lazy::new(|| Arc::new(SchemaCache::new()));

/// Once-only holder for a loaded schema.
#[derive(Debug, Default)]
pub struct SchemaCache {
    cell: OnceCell<Arc<dyn Schema>>,
}

impl SchemaCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Process-wide cache shared by writers that do not bring their own
    pub fn global() -> Arc<SchemaCache> {
        Arc::clone(&GLOBAL_CACHE)
    }

    /// The built-in remote-write v1 schema
    pub fn default_schema() -> Arc<dyn Schema> {
        Arc::clone(&DEFAULT_SCHEMA)
    }

    /// Schema currently cached, if any
    pub fn cached(&self) -> Option<Arc<dyn Schema>> {
        self.cell.get().cloned()
    }

    /// Resolve the schema for a push.
    ///
    /// A cached schema is returned unconditionally. Otherwise a supplied
    /// path is loaded once and cached; without a path the built-in schema
    /// is returned and nothing is cached.
    pub async fn resolve(
        &self,
        proto: Option<&Path>,
        provider: &dyn SchemaProvider,
    ) -> Result<Arc<dyn Schema>> {
        if let Some(schema) = self.cell.get() {
            return Ok(Arc::clone(schema));
        }

        match proto {
            Some(path) => {
                let schema = self
                    .cell
                    .get_or_try_init(|| async {
                        let schema = provider.load(path).await?;
                        tracing::debug!(
                            "Loaded protocol definitions {} from {}",
                            schema.name(),
                            path.display()
                        );
                        Ok::<_, PushError>(schema)
                    })
                    .await?;
                Ok(Arc::clone(schema))
            },
            None => Ok(Self::default_schema()),
        }
    }
}
