//! Common test utilities and fixtures.

#![allow(dead_code)]

use promwrite::core::{MetricFamily, Sample};
use promwrite::remote_write::proto::WriteRequest;
use promwrite::remote_write::{decompress, RemoteWriteV1, RemoteWriter, Schema, SchemaCache};
use std::sync::{Arc, Mutex};

/// Remote-write path served by the mock endpoint.
pub const WRITE_PATH: &str = "/api/v1/write";

/// Registry snapshot in the JSON export shape, one family of each type.
pub const REGISTRY_SNAPSHOT: &str = r#"[
  {"help": "A custom counter metric", "name": "custom_counter", "type": "counter",
   "values": [{"value": 5, "labels": {}}], "aggregator": "sum"},
  {"help": "A custom gauge metric", "name": "custom_gauge", "type": "gauge",
   "values": [{"value": 2.5, "labels": {}, "timestamp": 1700000000000}], "aggregator": "sum"},
  {"name": "custom_histogram", "help": "A custom histogram metric", "type": "histogram",
   "aggregator": "sum",
   "values": [
     {"labels": {"le": 0.1}, "value": 0, "metricName": "custom_histogram_bucket"},
     {"labels": {"le": 5}, "value": 2, "metricName": "custom_histogram_bucket"},
     {"labels": {"le": "+Inf"}, "value": 3, "metricName": "custom_histogram_bucket"},
     {"labels": {}, "value": 17.25, "metricName": "custom_histogram_sum"},
     {"labels": {}, "value": 3, "metricName": "custom_histogram_count"}
   ]},
  {"name": "custom_summary", "help": "A custom summary metric", "type": "summary",
   "aggregator": "sum",
   "values": [
     {"labels": {"quantile": 0.5}, "value": 4.2},
     {"labels": {"quantile": 0.99}, "value": 9.7},
     {"metricName": "custom_summary_sum", "labels": {}, "value": 13.9},
     {"metricName": "custom_summary_count", "labels": {}, "value": 2}
   ]}
]"#;

/// Parse the registry snapshot fixture.
pub fn registry_snapshot() -> Vec<MetricFamily> {
    serde_json::from_str(REGISTRY_SNAPSHOT).unwrap()
}

/// A single counter family.
pub fn counter(name: &str, value: f64) -> MetricFamily {
    MetricFamily::Counter {
        name: name.to_string(),
        labels: None,
        values: vec![Sample::new(value)],
    }
}

/// Writer with its own schema cache so tests stay independent.
pub fn isolated_writer() -> RemoteWriter {
    RemoteWriter::new()
        .unwrap()
        .with_schema_cache(Arc::new(SchemaCache::new()))
}

/// Decode a captured request body back into a write request.
pub fn decode_body(body: &[u8]) -> WriteRequest {
    let raw = decompress(body).unwrap();
    RemoteWriteV1::new().decode(&raw).unwrap()
}

/// Label value of a decoded series.
pub fn label<'a>(series: &'a promwrite::remote_write::proto::TimeSeries, name: &str) -> Option<&'a str> {
    series
        .labels
        .iter()
        .find(|l| l.name == name)
        .map(|l| l.value.as_str())
}

/// In-memory log sink for logger override tests.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    /// Dispatch that writes plain-text logs into this capture.
    pub fn dispatch(&self) -> tracing::Dispatch {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish();
        tracing::Dispatch::new(subscriber)
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
