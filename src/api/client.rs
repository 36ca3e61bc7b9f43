//! HTTP client core.
//!
//! One [`HttpClient`] exists per process. It owns the base URL, the
//! transport and the middleware [`Pipeline`]; every typed endpoint call goes
//! through [`HttpClient::execute`], which runs, in order:
//!
//! 1. the request stages (credential stamping),
//! 2. the transport send,
//! 3. the response stages (auth-failure funnel).
//!
//! Calls block the calling thread until the response arrives or the timeout
//! elapses. There is no cancellation and no retry.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::middleware::Pipeline;
use crate::constants::LOGIN_PATH;

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// HTTP method of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request on its way to the backend.
///
/// `path` is relative to the client's base URL and already carries any
/// percent-encoded identifiers. Query values are encoded by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<serde_json::Value>,
    /// Caller reports failures itself; generic error output is suppressed.
    pub skip_global_error: bool,
}

impl OutboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
            skip_global_error: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a query parameter only when a value is present.
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Decode {
            path: self.path.clone(),
            message: format!("failed to encode request body: {e}"),
            skip_global_error: self.skip_global_error,
        })?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn skip_global_error(mut self) -> Self {
        self.skip_global_error = true;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value.into());
    }

    /// Whether this request targets the login endpoint.
    pub fn is_login(&self) -> bool {
        self.path.contains(LOGIN_PATH)
    }
}

/// A 2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// Parse the body as JSON.
    ///
    /// An empty body and a literal `null` both come back as `None` so callers
    /// can substitute their defaults. A decode failure keeps the request's
    /// `skip_global_error` flag.
    pub fn json<T: DeserializeOwned>(
        &self,
        path: &str,
        skip_global_error: bool,
    ) -> Result<Option<T>, ApiError> {
        if self.body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str::<Option<T>>(&self.body).map_err(|e| ApiError::Decode {
            path: path.to_string(),
            message: e.to_string(),
            skip_global_error,
        })
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Sends a fully prepared request over the wire.
///
/// Non-2xx responses must be reported as [`ApiError::Status`].
pub trait Transport {
    fn send(&self, base_url: &str, request: &OutboundRequest) -> Result<ApiResponse, ApiError>;
}

/// Blocking transport backed by a shared `ureq` agent.
#[derive(Debug)]
pub struct UreqTransport {
    agent: ureq::Agent,
    timeout: Duration,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            timeout,
        }
    }

    /// Overall per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Transport for UreqTransport {
    fn send(&self, base_url: &str, request: &OutboundRequest) -> Result<ApiResponse, ApiError> {
        let url = format!("{base_url}{}", request.path);

        let mut call = self.agent.request(request.method.as_str(), &url);
        for (key, value) in &request.query {
            call = call.query(key, value);
        }
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }

        let result = match &request.body {
            Some(body) => call.send_json(body),
            None => call.call(),
        };

        match result {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.into_string().map_err(|e| ApiError::Transport {
                    path: request.path.clone(),
                    message: format!("failed to read response body: {e}"),
                    skip_global_error: request.skip_global_error,
                })?;
                Ok(ApiResponse { status, body })
            }
            Err(ureq::Error::Status(status, resp)) => Err(ApiError::Status {
                status,
                path: request.path.clone(),
                body: resp.into_string().unwrap_or_default(),
                skip_global_error: request.skip_global_error,
            }),
            Err(ureq::Error::Transport(t)) => Err(ApiError::Transport {
                path: request.path.clone(),
                message: t.to_string(),
                skip_global_error: request.skip_global_error,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// The process-wide HTTP client.
pub struct HttpClient {
    base_url: String,
    transport: Box<dyn Transport>,
    pipeline: Pipeline,
}

impl HttpClient {
    pub fn new(base_url: &str, transport: Box<dyn Transport>, pipeline: Pipeline) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            pipeline,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run one request through the pipeline and the transport.
    pub fn execute(&self, mut request: OutboundRequest) -> Result<ApiResponse, ApiError> {
        if request.header("Content-Type").is_none() {
            request.set_header("Content-Type", "application/json");
        }

        self.pipeline.run_request_stages(&mut request)?;

        tracing::debug!(method = %request.method, path = %request.path, "sending request");
        let result = self.transport.send(&self.base_url, &request);
        match &result {
            Ok(resp) => {
                tracing::debug!(path = %request.path, status = resp.status, "request succeeded");
            }
            Err(e) => tracing::debug!(path = %request.path, error = %e, "request failed"),
        }

        self.pipeline.run_response_stages(&request, result)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
