//! Upstream adapter: one validated call → one bounded upstream attempt.
//!
//! The per-API crates implement [`UpstreamClient`] (tool → endpoint
//! descriptor + request body); this module owns execution with a timeout
//! and the translation of the upstream response into a uniform outcome.
//! There are no implicit retries: callers needing resilience layer retries
//! above this component.

use crate::validate::ValidatedCall;
use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// A per-tool precondition the schema cannot express failed before any
    /// request was built (e.g. "collection needs at least one IOC").
    /// Surfaced to the caller as an invalid-arguments error.
    #[error("{0}")]
    Domain(String),
    /// The catalog and the client disagree about a tool; a gateway defect.
    #[error("no upstream mapping for tool '{0}'")]
    Mapping(String),
    /// Connection, TLS or DNS failure; no status code was received.
    #[error("upstream transport error: {0}")]
    Transport(String),
    /// The bounded attempt did not complete in time. The remote side may
    /// still be processing; abandonment only means we stopped waiting.
    #[error("upstream request timed out")]
    Timeout,
}

/// Endpoint descriptor plus serialized arguments for one upstream request.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl UpstreamRequest {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// What came back over the wire, before interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// The uniform per-call result: a received response, classified.
/// Transport failures and timeouts never reach this type; they surface as
/// [`UpstreamError`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamOutcome {
    /// 2xx. An empty body (and specifically 204 No Content) is an empty
    /// success value, not an error.
    Success { status: u16, body: Value },
    /// ≥400, with the parsed error body when parseable, else the bare
    /// status.
    Failed { status: u16, error: Value },
}

/// The pluggable upstream collaborator: maps a validated call to a request
/// and executes it. One `prepare` + one `execute` per admitted call.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Map a validated call to its fixed endpoint and request body.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Domain`] for per-tool preconditions and
    /// [`UpstreamError::Mapping`] when the tool has no mapping.
    fn prepare(&self, call: &ValidatedCall) -> Result<UpstreamRequest, UpstreamError>;

    /// Execute the request (single attempt, no internal timeout; the
    /// adapter bounds the call).
    async fn execute(&self, request: &UpstreamRequest) -> Result<RawResponse, UpstreamError>;
}

/// Shared reqwest-based executor used by the HTTP(S)/GraphQL clients.
/// Credentials ride in the client's default headers.
pub struct HttpExecutor {
    client: reqwest::Client,
    base: Url,
}

impl HttpExecutor {
    /// Build an executor for a base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute `http(s)` URL or
    /// the HTTP client cannot be constructed.
    pub fn new(base_url: &str, default_headers: HeaderMap) -> anyhow::Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("invalid upstream base URL '{base_url}': {e}"))?;
        if !matches!(base.scheme(), "http" | "https") {
            anyhow::bail!(
                "invalid upstream base URL '{base_url}': scheme must be http or https"
            );
        }
        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .build()?;
        Ok(Self { client, base })
    }

    /// Send one request and collect the full response body.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Transport`] on connection/TLS/DNS failures
    /// or when the body cannot be read.
    pub async fn send(&self, request: &UpstreamRequest) -> Result<RawResponse, UpstreamError> {
        let url = self
            .base
            .join(&request.path)
            .map_err(|e| UpstreamError::Transport(format!("invalid request path: {e}")))?;

        let mut builder = self.client.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(sanitize_transport_error(&e)))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Transport(sanitize_transport_error(&e)))?
            .to_vec();
        Ok(RawResponse { status, body })
    }
}

/// Reduce a reqwest error to a category. The full error can carry URLs,
/// credentials-in-query and resolver detail; none of that belongs in a
/// protocol response.
fn sanitize_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "timed out".to_string()
    } else if error.is_connect() {
        "connection failed".to_string()
    } else if error.is_body() || error.is_decode() {
        "failed to read response body".to_string()
    } else {
        "request failed".to_string()
    }
}

/// Executes validated calls against one [`UpstreamClient`] with an
/// upper-bound timeout. Exactly one upstream attempt per call.
pub struct Adapter<C> {
    client: C,
    timeout: Duration,
}

impl<C: UpstreamClient> Adapter<C> {
    #[must_use]
    pub fn new(client: C, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Forward one validated call upstream and classify the response.
    ///
    /// # Errors
    ///
    /// Propagates `prepare` failures, transport failures, and
    /// [`UpstreamError::Timeout`] when the bounded attempt does not
    /// complete in time.
    pub async fn invoke(&self, call: &ValidatedCall) -> Result<UpstreamOutcome, UpstreamError> {
        let request = self.client.prepare(call)?;
        debug!(tool = %call.tool, method = %request.method, path = %request.path, "forwarding upstream");

        let raw = match tokio::time::timeout(self.timeout, self.client.execute(&request)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(tool = %call.tool, timeout = ?self.timeout, "upstream attempt timed out");
                return Err(UpstreamError::Timeout);
            }
        };

        Ok(classify(&raw))
    }
}

fn classify(raw: &RawResponse) -> UpstreamOutcome {
    let status = raw.status;
    if (200..300).contains(&status) {
        // 204 and a zero-length 2xx body both mean "empty success value".
        if status == 204 || raw.body.is_empty() {
            return UpstreamOutcome::Success {
                status,
                body: json!({}),
            };
        }
        return match serde_json::from_slice::<Value>(&raw.body) {
            Ok(body) => UpstreamOutcome::Success { status, body },
            // A 2xx body that is not JSON is still a success; pass the
            // text through rather than failing the call.
            Err(_) => UpstreamOutcome::Success {
                status,
                body: Value::String(String::from_utf8_lossy(&raw.body).into_owned()),
            },
        };
    }

    let error = serde_json::from_slice::<Value>(&raw.body)
        .unwrap_or_else(|_| json!({ "status": status }));
    UpstreamOutcome::Failed { status, error }
}
