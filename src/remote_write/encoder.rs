//! Building and serializing remote-write requests.

use crate::core::{PushError, Result, Series};
use crate::remote_write::labels::merge_labels;
use crate::remote_write::proto::{Sample, TimeSeries, WriteRequest};
use crate::remote_write::schema::Schema;
use std::collections::BTreeMap;

/// Current wall-clock time in unix milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Build the wire request for a list of series.
///
/// Default labels are merged into every series. Samples without a
/// timestamp, or with a zero one, are stamped with `now_ms`.
pub fn build_write_request(
    series: &[Series],
    defaults: &BTreeMap<String, String>,
    now_ms: i64,
) -> WriteRequest {
    let timeseries = series
        .iter()
        .map(|s| TimeSeries {
            labels: merge_labels(defaults, &s.labels)
                .into_iter()
                .map(Into::into)
                .collect(),
            samples: s
                .samples
                .iter()
                .map(|sample| Sample {
                    value: sample.value,
                    timestamp: sample.timestamp.filter(|ts| *ts != 0).unwrap_or(now_ms),
                })
                .collect(),
        })
        .collect();

    WriteRequest { timeseries }
}

/// Validate a request against the schema and serialize it.
pub fn encode_request(schema: &dyn Schema, request: &WriteRequest) -> Result<Vec<u8>> {
    if let Some(violation) = schema.verify(request) {
        return Err(PushError::encoding(violation));
    }
    Ok(schema.encode(request))
}
