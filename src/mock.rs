//! In-memory transport for tests
//!
//! `MockTransport` answers from a script or a handler function and records every
//! request it receives, so tests can count calls and inspect headers and bodies.
//!
//! ```rust
//! use pocket_bar_client::mock::MockTransport;
//! use reqwest::StatusCode;
//! use serde_json::json;
//!
//! let transport = MockTransport::from_fn(|request| {
//!     match request.bearer.as_deref() {
//!         Some("fresh") => MockTransport::reply(StatusCode::OK, Some(json!([]))),
//!         _ => MockTransport::reply(StatusCode::UNAUTHORIZED, Some(json!("Token expired"))),
//!     }
//! });
//! assert_eq!(transport.call_count(), 0);
//! ```

use crate::transport::{HttpReply, HttpRequest, Transport, TransportError, TransportFault};
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Duration;

/// What the mock answers for one call
pub type Scripted = Result<HttpReply, TransportError>;

type Handler = dyn Fn(&HttpRequest) -> Scripted + Send + Sync;

pub struct MockTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<HttpRequest>>,
    latency: Option<Duration>,
}

impl MockTransport {
    /// Transport with nothing scripted: every call fails with a transport fault
    pub fn new() -> Self {
        Self::sequence(Vec::<Scripted>::new())
    }

    pub fn from_fn(handler: impl Fn(&HttpRequest) -> Scripted + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
            latency: None,
        }
    }

    /// Answer calls in order, regardless of what they ask for
    pub fn sequence(replies: impl IntoIterator<Item = Scripted>) -> Self {
        let queue = Mutex::new(replies.into_iter().collect::<VecDeque<_>>());
        Self::from_fn(move |request| {
            queue.lock().pop_front().unwrap_or_else(|| {
                Err(TransportError::new(
                    TransportFault::Other,
                    format!("no scripted reply left for {} {}", request.method, request.path),
                ))
            })
        })
    }

    pub fn reply(status: StatusCode, body: Option<Value>) -> Scripted {
        Ok(HttpReply::new(status, body))
    }

    pub fn fault(error: TransportError) -> Scripted {
        Err(error)
    }

    /// Delay every answer, so concurrent calls overlap
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls.lock().iter().filter(|call| call.path == path).count()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Scripted {
        self.calls.lock().push(request.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        (self.handler)(&request)
    }
}
