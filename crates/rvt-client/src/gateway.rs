//! Request gateway for the revision tracker service.
//!
//! The gateway is the only place that speaks HTTP. Every call resolves to a
//! value: transport errors, timeouts and non-success statuses are all folded
//! into [`Failure`], so callers branch on a `Result` and never have to catch
//! anything.

use std::time::{Duration, Instant};

use reqwest::{Client, Method, StatusCode, header};
use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::Value;
use thiserror::Error;

use crate::metrics;

/// Base address used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Maximum wait for a single call, body included
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a gateway call or a domain operation built on top of one
pub type ApiResult<T> = Result<T, Failure>;

/// A normalized failure.
///
/// The `Display` output is the human readable `detail` shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    /// The call did not complete within the configured timeout
    #[error("Request timed out. Please check if the backend server is running.")]
    Timeout,
    /// Connection refused, DNS failure or any other transport-level error
    #[error("Cannot connect to server. Please ensure the backend is running on {base_url}")]
    Connectivity { base_url: String, reason: String },
    /// The service answered with a non-success status
    #[error("{detail}")]
    Application { status: u16, detail: String },
    /// The service answered with a success status but the body could not be decoded
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl Failure {
    /// The user-facing message for this failure
    pub fn detail(&self) -> String {
        self.to_string()
    }

    /// HTTP status of an application failure
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Application { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short label used for logs and metrics
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connectivity { .. } => "connectivity",
            Self::Application { .. } => "application",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Failures serialize to the service's own error shape: `{"detail": "..."}`.
impl Serialize for Failure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("detail", &self.detail())?;
        map.end()
    }
}

/// Per-call options for [`Gateway::send`]
#[derive(Debug, Clone, Default)]
pub struct RequestOptions<'a> {
    pub method: Method,
    /// Bearer credential, attached only when present and non-empty
    pub token: Option<&'a str>,
    pub query: &'a [(&'static str, String)],
    pub body: Option<&'a Value>,
}

/// Issues one HTTP request per call against a fixed base address
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Gateway {
    /// Create a gateway for `base_url` with the given timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one request and normalize the outcome.
    ///
    /// Success yields the decoded JSON body unchanged (`null` for an empty
    /// body). Everything else yields a [`Failure`]. The timeout covers the
    /// whole exchange; a response arriving after it is discarded.
    pub async fn send(&self, endpoint: &str, options: RequestOptions<'_>) -> ApiResult<Value> {
        let started = Instant::now();
        let method = options.method.clone();

        let outcome = tokio::time::timeout(self.timeout, self.exchange(endpoint, options))
            .await
            .unwrap_or(Err(Failure::Timeout));

        let elapsed = started.elapsed();
        metrics::record_gateway_call(method.as_str(), endpoint, outcome.as_ref().err(), elapsed);

        match &outcome {
            Ok(_) => tracing::debug!(
                %method,
                endpoint,
                elapsed_ms = elapsed.as_millis() as u64,
                "request completed"
            ),
            Err(failure) => tracing::warn!(
                %method,
                endpoint,
                kind = failure.kind(),
                status = failure.status(),
                "request failed: {failure}"
            ),
        }

        outcome
    }

    async fn exchange(&self, endpoint: &str, options: RequestOptions<'_>) -> ApiResult<Value> {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut request = self
            .client
            .request(options.method, &url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");

        if !options.query.is_empty() {
            request = request.query(options.query);
        }
        if let Some(token) = options.token.filter(|token| !token.is_empty()) {
            request = request.bearer_auth(token);
        }
        if let Some(body) = options.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_failure(&e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_failure(&e))?;

        if status.is_success() {
            decode_success(&bytes)
        } else {
            Err(application_failure(status, &bytes))
        }
    }

    fn transport_failure(&self, error: &reqwest::Error) -> Failure {
        if error.is_timeout() {
            return Failure::Timeout;
        }

        Failure::Connectivity {
            base_url: self.base_url.clone(),
            reason: error.to_string(),
        }
    }
}

fn decode_success(bytes: &[u8]) -> ApiResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    serde_json::from_slice(bytes).map_err(|e| Failure::InvalidResponse(e.to_string()))
}

/// Structured `detail` first, then the raw body, then the status line
fn application_failure(status: StatusCode, bytes: &[u8]) -> Failure {
    let detail = serde_json::from_slice::<Value>(bytes)
        .ok()
        .as_ref()
        .and_then(detail_from_body)
        .or_else(|| {
            let text = String::from_utf8_lossy(bytes).trim().to_string();
            (!text.is_empty()).then_some(text)
        })
        .unwrap_or_else(|| {
            format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )
        });

    Failure::Application {
        status: status.as_u16(),
        detail,
    }
}

fn detail_from_body(body: &Value) -> Option<String> {
    match body.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => return Some(detail.clone()),
        // Request validation errors come back as a list of `{loc, msg, type}`
        Some(Value::Array(errors)) => {
            let messages: Vec<&str> = errors
                .iter()
                .filter_map(|error| error.get("msg").and_then(Value::as_str))
                .collect();
            if !messages.is_empty() {
                return Some(messages.join("; "));
            }
        }
        _ => {}
    }

    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
}
