//! HTTP transport abstraction
//!
//! A transport performs exactly one HTTP exchange. It never interprets the
//! status code: any answer from the server is an [`HttpReply`], and only faults
//! that prevent a complete answer become a [`TransportError`].

use crate::config::ClientConfig;
use crate::error::Result;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

/// One outgoing call
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path relative to the API base, always starting with `/`
    pub path: String,
    pub body: Option<Value>,
    /// Bearer token; no Authorization header is sent when absent
    pub bearer: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            bearer: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_bearer(mut self, bearer: Option<String>) -> Self {
        self.bearer = bearer;
        self
    }

    /// Value of the Authorization header this request carries
    pub fn authorization(&self) -> Option<String> {
        self.bearer.as_ref().map(|token| format!("bearer {token}"))
    }
}

/// Complete answer from the server, whatever its status
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: StatusCode,
    /// Parsed JSON body; a non-JSON body is kept as a JSON string, an empty one is `None`
    pub body: Option<Value>,
}

impl HttpReply {
    pub fn new(status: StatusCode, body: Option<Value>) -> Self {
        Self { status, body }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self { status, body: None }
    }
}

/// What went wrong below HTTP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFault {
    Timeout,
    Connect,
    Body,
    Other,
}

/// Fault that kept the transport from producing a complete reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub fault: TransportFault,
    /// Status line, when one was received before the fault
    pub status: Option<StatusCode>,
    pub message: String,
}

impl TransportError {
    pub fn new(fault: TransportFault, message: impl Into<String>) -> Self {
        Self {
            fault,
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Best-effort status for the failure result: a received status wins,
    /// then timeouts map to 408 and connect failures to 503.
    pub fn recoverable_status(&self) -> Option<StatusCode> {
        self.status.or(match self.fault {
            TransportFault::Timeout => Some(StatusCode::REQUEST_TIMEOUT),
            TransportFault::Connect => Some(StatusCode::SERVICE_UNAVAILABLE),
            TransportFault::Body | TransportFault::Other => None,
        })
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{:?} fault after status {}: {}", self.fault, status, self.message),
            None => write!(f, "{:?} fault: {}", self.fault, self.message),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let fault = if error.is_timeout() {
            TransportFault::Timeout
        } else if error.is_connect() {
            TransportFault::Connect
        } else if error.is_body() || error.is_decode() {
            TransportFault::Body
        } else {
            TransportFault::Other
        };

        Self {
            fault,
            status: error.status(),
            message: error.to_string(),
        }
    }
}

/// Generic HTTP call primitive
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = std::result::Result<HttpReply, TransportError>> + Send;
}

/// reqwest-backed transport against one API base URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    http_client: Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client: builder.build()?,
        })
    }

    /// Wrap an already configured reqwest client
    pub fn with_client(base_url: &str, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpReply, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(method = %request.method, url = %url, authorized = request.bearer.is_some(), "Sending request");

        let mut builder = self.http_client.request(request.method.clone(), &url);
        if let Some(authorization) = request.authorization() {
            builder = builder.header(AUTHORIZATION, authorization);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::from(e).with_status(status))?;

        Ok(HttpReply {
            status,
            body: decode_body(&bytes),
        })
    }
}

/// Transport outcome that still has a status to report
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Delivery {
    Reply(HttpReply),
    /// Fault with a best-effort status
    Fault(StatusCode, TransportError),
}

impl Delivery {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Delivery::Reply(reply) => reply.status,
            Delivery::Fault(status, _) => *status,
        }
    }
}

/// Send one request; a fault without any recoverable status is returned as `Err`
pub(crate) async fn deliver<X: Transport>(
    transport: &X,
    request: HttpRequest,
) -> std::result::Result<Delivery, TransportError> {
    let method = request.method.clone();
    let path = request.path.clone();

    match transport.send(request).await {
        Ok(reply) => {
            debug!(method = %method, path = %path, status = %reply.status, "Received reply");
            Ok(Delivery::Reply(reply))
        }
        Err(e) => match e.recoverable_status() {
            Some(status) => {
                warn!(method = %method, path = %path, status = %status, error = %e, "Transport fault, reporting best-effort status");
                Ok(Delivery::Fault(status, e))
            }
            None => {
                error!(method = %method, path = %path, error = %e, "Transport fault without any status");
                Err(e)
            }
        },
    }
}

/// Empty → `None`, JSON → parsed value, anything else → JSON string of the text
pub(crate) fn decode_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }

    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}
