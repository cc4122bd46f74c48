//! Core domain models, configuration and errors for promwrite.
//!
//! This module contains the metric snapshot shapes, the uniform series
//! representation and the delivery outcome shared by the pipeline.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AuthConfig, Config, ConfigBuilder, DeliveryOptions, LogLevel, PushConfig};
pub use error::{PushError, Result};
pub use types::{
    BucketSample, DeliveryResult, Label, MetricFamily, Sample, Series, SeriesLabels,
    METRIC_NAME_LABEL,
};
