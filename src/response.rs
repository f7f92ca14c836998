//! Uniform operation result

use crate::transport::{Delivery, HttpReply, TransportError};
use crate::types::Credential;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Closed set of failure classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 401 that could not be cured by renewal
    Authentication,
    /// 403
    Authorization,
    /// Any other non-2xx answer
    Resource,
    /// 2xx, but not the exact status the operation requires
    UnexpectedStatus,
    /// 2xx read without the body it must carry
    EmptyBody,
    /// 2xx body that does not decode into the expected shape
    InvalidBody,
    /// Transport fault reported with a best-effort status
    Transport,
}

impl FailureKind {
    pub fn for_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => FailureKind::Authentication,
            StatusCode::FORBIDDEN => FailureKind::Authorization,
            s if s.is_success() => FailureKind::UnexpectedStatus,
            _ => FailureKind::Resource,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

/// Either data or an error message, never both
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure(Failure),
}

/// Result of one client operation
///
/// `renewed`, when present, is the credential obtained during this operation. It
/// supersedes whatever the caller held and should be handed to the session holder.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    status: StatusCode,
    outcome: Outcome<T>,
    renewed: Option<Credential>,
}

impl<T> ApiResponse<T> {
    pub fn success(status: StatusCode, data: T) -> Self {
        Self {
            status,
            outcome: Outcome::Success(data),
            renewed: None,
        }
    }

    pub fn failure(status: StatusCode, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            status,
            outcome: Outcome::Failure(Failure {
                kind,
                message: message.into(),
            }),
            renewed: None,
        }
    }

    pub(crate) fn with_renewed(mut self, renewed: Option<Credential>) -> Self {
        self.renewed = renewed;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    pub fn outcome(&self) -> &Outcome<T> {
        &self.outcome
    }

    pub fn data(&self) -> Option<&T> {
        match &self.outcome {
            Outcome::Success(data) => Some(data),
            Outcome::Failure(_) => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure(failure) => Some(failure.kind),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure(failure) => Some(&failure.message),
        }
    }

    pub fn renewed_credential(&self) -> Option<&Credential> {
        self.renewed.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        match self.outcome {
            Outcome::Success(data) => Some(data),
            Outcome::Failure(_) => None,
        }
    }

    pub fn into_parts(self) -> (StatusCode, Outcome<T>, Option<Credential>) {
        (self.status, self.outcome, self.renewed)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            status: self.status,
            outcome: match self.outcome {
                Outcome::Success(data) => Outcome::Success(f(data)),
                Outcome::Failure(failure) => Outcome::Failure(failure),
            },
            renewed: self.renewed,
        }
    }
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Non-2xx → failure; 2xx must carry a body that decodes into `T`
    pub(crate) fn from_reply(reply: HttpReply) -> Self {
        let HttpReply { status, body } = reply;
        if !status.is_success() {
            return Self::failure(status, FailureKind::for_status(status), error_message(status, body));
        }

        match body {
            Some(body) => decode(status, body),
            None => Self::failure(status, FailureKind::EmptyBody, "successful response carried no body"),
        }
    }
}

impl<T: DeserializeOwned> ApiResponse<Option<T>> {
    /// Like [`ApiResponse::from_reply`], but a 2xx without body is still a success
    pub(crate) fn from_optional_reply(reply: HttpReply) -> Self {
        let HttpReply { status, body } = reply;
        if !status.is_success() {
            return Self::failure(status, FailureKind::for_status(status), error_message(status, body));
        }

        match body {
            Some(body) => decode::<T>(status, body).map(Some),
            None => Self::success(status, None),
        }
    }
}

impl ApiResponse<()> {
    /// Status only, any 2xx body is dropped
    pub(crate) fn from_bodiless_reply(reply: HttpReply) -> Self {
        let HttpReply { status, body } = reply;
        if status.is_success() {
            Self::success(status, ())
        } else {
            Self::failure(status, FailureKind::for_status(status), error_message(status, body))
        }
    }
}

fn decode<T: DeserializeOwned>(status: StatusCode, body: Value) -> ApiResponse<T> {
    match serde_json::from_value(body) {
        Ok(data) => ApiResponse::success(status, data),
        Err(e) => ApiResponse::failure(
            status,
            FailureKind::InvalidBody,
            format!("response body did not match the expected shape: {e}"),
        ),
    }
}

impl<T> ApiResponse<T> {
    pub(crate) fn from_transport_error(status: StatusCode, error: &TransportError) -> Self {
        Self::failure(status, FailureKind::Transport, error.message.clone())
    }

    /// Turn a delivery into a response, interpreting replies with `on_reply`
    pub(crate) fn settle(delivery: Delivery, on_reply: impl FnOnce(HttpReply) -> Self) -> Self {
        match delivery {
            Delivery::Reply(reply) => on_reply(reply),
            Delivery::Fault(status, error) => Self::from_transport_error(status, &error),
        }
    }
}

/// Server-provided error text, falling back to the status' reason phrase
pub(crate) fn error_message(status: StatusCode, body: Option<Value>) -> String {
    match body {
        Some(Value::String(text)) if !text.is_empty() => text,
        Some(Value::Null) | Some(Value::String(_)) | None => status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string(),
        Some(other) => other.to_string(),
    }
}
