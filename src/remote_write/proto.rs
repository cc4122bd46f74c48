//! Prometheus remote-write v1 protobuf messages.
//!
//! Hand-written prost types matching `prometheus/prompb/remote.proto` and
//! `types.proto`, so no protoc run is needed at build time.

/// Root message of a remote-write request.
#[derive(Clone, PartialEq, prost::Message)]
pub struct WriteRequest {
    /// Series to write
    #[prost(message, repeated, tag = "1")]
    pub timeseries: Vec<TimeSeries>,
}

/// One labeled series with its samples.
#[derive(Clone, PartialEq, prost::Message)]
pub struct TimeSeries {
    /// Series labels, `__name__` included
    #[prost(message, repeated, tag = "1")]
    pub labels: Vec<Label>,
    /// Samples, oldest first
    #[prost(message, repeated, tag = "2")]
    pub samples: Vec<Sample>,
}

/// Label pair.
#[derive(Clone, PartialEq, Eq, Hash, prost::Message)]
pub struct Label {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

/// Sample value with millisecond timestamp.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Sample {
    #[prost(double, tag = "1")]
    pub value: f64,
    #[prost(int64, tag = "2")]
    pub timestamp: i64,
}

impl From<crate::core::Label> for Label {
    fn from(label: crate::core::Label) -> Self {
        Label {
            name: label.name,
            value: label.value,
        }
    }
}
