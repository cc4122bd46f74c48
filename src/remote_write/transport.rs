//! HTTP delivery of compressed write requests.

use crate::core::{DeliveryOptions, DeliveryResult, PushError, Result};
use crate::remote_write::proto::WriteRequest;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_ENCODING, CONTENT_TYPE};
use std::time::{Duration, Instant};

/// Content type of a remote-write body.
pub const PROTOBUF_CONTENT_TYPE: &str = "application/vnd.google.protobuf";

/// Content encoding of a remote-write body.
pub const SNAPPY_ENCODING: &str = "snappy";

/// Sends compressed write requests to the configured endpoint.
#[derive(Debug, Clone, Default)]
pub struct Transport {
    client: reqwest::Client,
}

impl Transport {
    /// Create a transport with its own connection pool
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("promwrite/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Create a transport on top of an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// POST a compressed body to the endpoint.
    ///
    /// Completed exchanges resolve to a [`DeliveryResult`] whatever their
    /// status. Connection failures and timeouts are returned as errors and
    /// are not retried.
    pub async fn send(
        &self,
        body: Bytes,
        request: &WriteRequest,
        options: &DeliveryOptions,
    ) -> Result<DeliveryResult> {
        if request.timeseries.is_empty() {
            return Ok(DeliveryResult::ok());
        }

        let Some(url) = options.url.as_deref() else {
            return Ok(DeliveryResult::no_endpoint());
        };

        let headers = request_headers(options)?;
        let mut builder = self.client.post(url).timeout(options.timeout);
        if let Some((username, password)) = options.basic_auth() {
            builder = builder.basic_auth(username, Some(password));
        }

        let started = Instant::now();
        let response = builder
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| classify(e, options.timeout))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| classify(e, options.timeout))?;
        let result = DeliveryResult::from_response(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            &text,
        );

        if options.verbose {
            log_response(options, &result, &text, request, started.elapsed());
        }

        Ok(result)
    }
}

/// Headers for a write request: caller headers first, then the protocol
/// headers, which caller headers cannot replace.
fn request_headers(options: &DeliveryOptions) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(options.headers.len() + 2);

    for (name, value) in &options.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| PushError::config(format!("Invalid header name '{}': {}", name, e)))?;
        if name == CONTENT_TYPE || name == CONTENT_ENCODING {
            continue;
        }
        let value = HeaderValue::from_str(value)
            .map_err(|e| PushError::config(format!("Invalid value for header '{}': {}", name, e)))?;
        headers.insert(name, value);
    }

    headers.insert(CONTENT_TYPE, HeaderValue::from_static(PROTOBUF_CONTENT_TYPE));
    headers.insert(CONTENT_ENCODING, HeaderValue::from_static(SNAPPY_ENCODING));
    Ok(headers)
}

fn classify(error: reqwest::Error, timeout: Duration) -> PushError {
    if error.is_timeout() {
        PushError::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    } else {
        PushError::Transport(error)
    }
}

/// Run `f` against the logger override when one is configured.
pub(crate) fn with_logger<F: FnOnce()>(options: &DeliveryOptions, f: F) {
    match &options.logger {
        Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
        None => f(),
    }
}

fn log_response(
    options: &DeliveryOptions,
    result: &DeliveryResult,
    body: &str,
    request: &WriteRequest,
    elapsed: Duration,
) {
    let series = request.timeseries.len();
    let samples: usize = request.timeseries.iter().map(|t| t.samples.len()).sum();

    with_logger(options, || {
        if !result.is_success() {
            tracing::warn!(
                series,
                samples,
                "Failed to send write request, error {} {} {}",
                result.status,
                result.status_text,
                body
            );
        } else if options.timing {
            tracing::info!(
                series,
                samples,
                "Write request sent {} {} in {} ms",
                result.status,
                result.status_text,
                elapsed.as_millis()
            );
        } else {
            tracing::info!(
                series,
                samples,
                "Write request sent {} {} {}",
                result.status,
                result.status_text,
                body
            );
        }
    });
}
