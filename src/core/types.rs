use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Label name that carries the metric identity of a series.
pub const METRIC_NAME_LABEL: &str = "__name__";

/// A single name/value label pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    /// Label name
    pub name: String,
    /// Label value
    pub value: String,
}

impl Label {
    /// Creates a new label
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.name, self.value)
    }
}

/// A single observation: value plus optional timestamp in unix milliseconds.
///
/// A missing timestamp is filled with the wall-clock time when the write
/// request is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Observed value
    pub value: f64,
    /// Timestamp in milliseconds since the unix epoch
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl Sample {
    /// Creates a sample stamped at push time
    pub fn new(value: f64) -> Self {
        Self {
            value,
            timestamp: None,
        }
    }

    /// Creates a sample with an explicit timestamp
    pub fn at(value: f64, timestamp: i64) -> Self {
        Self {
            value,
            timestamp: Some(timestamp),
        }
    }
}

/// Labels of a series before default labels are merged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesLabels {
    /// Pre-built ordered pairs. Default labels are appended as-is.
    Pairs(Vec<Label>),
    /// Name to value mapping. Series values win over default labels.
    Map(BTreeMap<String, String>),
}

impl Default for SeriesLabels {
    fn default() -> Self {
        SeriesLabels::Map(BTreeMap::new())
    }
}

impl From<Vec<Label>> for SeriesLabels {
    fn from(labels: Vec<Label>) -> Self {
        SeriesLabels::Pairs(labels)
    }
}

impl From<BTreeMap<String, String>> for SeriesLabels {
    fn from(labels: BTreeMap<String, String>) -> Self {
        SeriesLabels::Map(labels)
    }
}

/// Uniform time series handed to the encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Series labels, `__name__` included
    pub labels: SeriesLabels,
    /// Points in push order
    pub samples: Vec<Sample>,
}

impl Series {
    /// Creates a new series
    pub fn new(labels: impl Into<SeriesLabels>, samples: Vec<Sample>) -> Self {
        Self {
            labels: labels.into(),
            samples,
        }
    }

    /// Returns the `__name__` label value if present
    pub fn metric_name(&self) -> Option<&str> {
        match &self.labels {
            SeriesLabels::Pairs(pairs) => pairs
                .iter()
                .find(|l| l.name == METRIC_NAME_LABEL)
                .map(|l| l.value.as_str()),
            SeriesLabels::Map(map) => map.get(METRIC_NAME_LABEL).map(String::as_str),
        }
    }
}

/// One bucket or quantile observation of a histogram or summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSample {
    /// Per-sample labels (`le`, `quantile`, ...), values stringified on read
    #[serde(default, deserialize_with = "stringified_labels")]
    pub labels: BTreeMap<String, String>,
    /// Bucket count or quantile value
    pub value: f64,
    /// Per-bucket metric name such as `http_latency_bucket`
    #[serde(default, rename = "metricName", skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
}

/// One metric as exported by the registry snapshot.
///
/// Deserializes from the registry's JSON shape, keyed by the `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetricFamily {
    /// Monotonic counter
    Counter {
        /// Metric name
        name: String,
        /// Family-level labels
        #[serde(default, deserialize_with = "optional_stringified_labels")]
        labels: Option<BTreeMap<String, String>>,
        /// Samples, oldest first
        #[serde(default)]
        values: Vec<Sample>,
    },
    /// Point-in-time gauge
    Gauge {
        /// Metric name
        name: String,
        /// Family-level labels
        #[serde(default, deserialize_with = "optional_stringified_labels")]
        labels: Option<BTreeMap<String, String>>,
        /// Samples, oldest first
        #[serde(default)]
        values: Vec<Sample>,
    },
    /// Bucketed distribution
    Histogram {
        /// Metric name
        name: String,
        /// One entry per bucket, plus sum and count
        #[serde(default)]
        values: Vec<BucketSample>,
    },
    /// Quantile summary
    Summary {
        /// Metric name
        name: String,
        /// One entry per quantile, plus sum and count
        #[serde(default)]
        values: Vec<BucketSample>,
    },
}

impl MetricFamily {
    /// Returns the family name
    pub fn name(&self) -> &str {
        match self {
            MetricFamily::Counter { name, .. }
            | MetricFamily::Gauge { name, .. }
            | MetricFamily::Histogram { name, .. }
            | MetricFamily::Summary { name, .. } => name,
        }
    }

    /// Returns the lowercase type tag
    pub fn kind(&self) -> &'static str {
        match self {
            MetricFamily::Counter { .. } => "counter",
            MetricFamily::Gauge { .. } => "gauge",
            MetricFamily::Histogram { .. } => "histogram",
            MetricFamily::Summary { .. } => "summary",
        }
    }
}

/// Outcome of a delivery attempt that reached a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResult {
    /// HTTP status code
    pub status: u16,
    /// HTTP reason phrase
    pub status_text: String,
    /// Response body (or local reason) when status is not 200
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DeliveryResult {
    /// Successful delivery, or nothing to deliver
    pub fn ok() -> Self {
        Self {
            status: 200,
            status_text: "OK".to_string(),
            error_message: None,
        }
    }

    /// Result reported when no endpoint URL is configured
    pub fn no_endpoint() -> Self {
        Self {
            status: 400,
            status_text: "Bad request".to_string(),
            error_message: Some("No endpoint configured".to_string()),
        }
    }

    /// Builds a result from a completed HTTP exchange
    pub fn from_response(status: u16, status_text: impl Into<String>, body: &str) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            error_message: (status != 200).then(|| body.to_string()),
        }
    }

    /// Returns true if the endpoint accepted the write
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

impl fmt::Display for DeliveryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.status_text)?;
        if let Some(message) = &self.error_message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

fn stringify_label_value<E: de::Error>(name: &str, value: serde_json::Value) -> Result<String, E> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(E::custom(format!(
            "label '{}' has a non-scalar value: {}",
            name, other
        ))),
    }
}

fn stringified_labels<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(name, value)| {
            let value = stringify_label_value::<D::Error>(&name, value)?;
            Ok((name, value))
        })
        .collect()
}

fn optional_stringified_labels<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    raw.map(|raw| {
        raw.into_iter()
            .map(|(name, value)| {
                let value = stringify_label_value::<D::Error>(&name, value)?;
                Ok((name, value))
            })
            .collect()
    })
    .transpose()
}
