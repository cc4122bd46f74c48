//! promwrite - push application metrics over Prometheus remote write.
//!
//! promwrite turns a metric registry snapshot (counters, gauges, histograms
//! and summaries) into Prometheus remote-write v1 requests and delivers them
//! over HTTP.
//!
//! # Features
//!
//! - **Uniform series mapping**: histograms and summaries flattened per bucket/quantile
//! - **Default labels**: merged into every series, series labels take precedence
//! - **Wire format**: protobuf `WriteRequest`, snappy compressed
//! - **Delivery results**: remote rejections reported as values, network faults as errors
//!
//! # Architecture
//!
//! - `core`: Domain models, configuration and errors
//! - `remote_write`: Mapping, encoding, compression and transport
//! - `driver`: Periodic push loop
//! - `cli`: Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use promwrite::core::{DeliveryOptions, MetricFamily, Sample};
//! use promwrite::remote_write::RemoteWriter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let writer = RemoteWriter::new()?;
//!     let options = DeliveryOptions::new("http://localhost:9090/api/v1/write")
//!         .with_label("service", "sample-service");
//!
//!     let families = vec![MetricFamily::Counter {
//!         name: "custom_counter".to_string(),
//!         labels: None,
//!         values: vec![Sample::new(1.0)],
//!     }];
//!
//!     let result = writer.push_metrics(&families, &options).await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod cli;
pub mod core;
pub mod driver;
pub mod remote_write;

// Re-export core types for convenience
pub use crate::core::{Config, DeliveryOptions, DeliveryResult, PushError, Result};
pub use crate::remote_write::RemoteWriter;
