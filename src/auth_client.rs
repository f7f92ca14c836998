// Identity operations: login, register and credential refresh

use crate::config::IdentityRoutes;
use crate::error::{ClientError, Result};
use crate::response::{error_message, ApiResponse, FailureKind};
use crate::transport::{deliver, HttpReply, HttpRequest, Transport};
use crate::types::Credential;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Login form
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    /// Email or username
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Registration form, including the repeated password that never leaves the client
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(rename = "userName")]
    pub username: String,
    pub password: String,
    #[serde(skip)]
    pub repeat_password: String,
}

impl RegisterRequest {
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        repeat_password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
            repeat_password: repeat_password.into(),
        }
    }

    /// Local checks that must pass before anything is sent
    pub fn validate(&self) -> Result<()> {
        if self.password != self.repeat_password {
            return Err(ClientError::Validation(
                "password and its confirmation do not match".to_string(),
            ));
        }
        Ok(())
    }
}

/// Login, register and refresh calls against the identity routes
pub struct IdentityClient<X> {
    transport: Arc<X>,
    routes: IdentityRoutes,
}

impl<X> Clone for IdentityClient<X> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            routes: self.routes.clone(),
        }
    }
}

impl<X: Transport> IdentityClient<X> {
    pub fn new(transport: Arc<X>, routes: IdentityRoutes) -> Self {
        Self { transport, routes }
    }

    pub fn routes(&self) -> &IdentityRoutes {
        &self.routes
    }

    pub(crate) fn transport(&self) -> &X {
        &self.transport
    }

    /// Exchange email/username and password for a credential.
    ///
    /// Succeeds only on an exact 200; any other status is a failure and never
    /// carries a credential.
    pub async fn login(&self, request: &LoginRequest) -> Result<ApiResponse<Credential>> {
        let http_request =
            HttpRequest::new(Method::POST, self.routes.login.as_str()).with_body(serde_json::to_value(request)?);

        let response = self.issue(http_request).await?;
        match response.data() {
            Some(credential) => info!(username = %credential.username(), "Logged in"),
            None => warn!(status = %response.status(), "Login rejected"),
        }
        Ok(response)
    }

    /// Create an account and receive its first credential.
    ///
    /// A password confirmation mismatch is returned as
    /// [`ClientError::Validation`] without touching the network.
    pub async fn register(&self, request: &RegisterRequest) -> Result<ApiResponse<Credential>> {
        request.validate()?;

        let http_request = HttpRequest::new(Method::POST, self.routes.register.as_str())
            .with_body(serde_json::to_value(request)?);

        let response = self.issue(http_request).await?;
        match response.data() {
            Some(credential) => info!(username = %credential.username(), "Registered"),
            None => warn!(status = %response.status(), "Registration rejected"),
        }
        Ok(response)
    }

    /// Exchange a credential whose access token expired for a new one
    pub async fn refresh(&self, credential: &Credential) -> Result<ApiResponse<Credential>> {
        let http_request = HttpRequest::new(Method::POST, self.routes.refresh.as_str())
            .with_body(serde_json::to_value(credential)?)
            .with_bearer(Some(credential.token_value().to_string()));

        let delivery = deliver(self.transport.as_ref(), http_request).await?;
        let response = ApiResponse::settle(delivery, ApiResponse::from_reply);
        debug!(status = %response.status(), renewed = response.is_success(), "Refresh finished");
        Ok(response)
    }

    /// Login and register share the exact-200 rule
    async fn issue(&self, request: HttpRequest) -> Result<ApiResponse<Credential>> {
        let delivery = deliver(self.transport.as_ref(), request).await?;
        Ok(ApiResponse::settle(delivery, exact_ok))
    }
}

fn exact_ok(reply: HttpReply) -> ApiResponse<Credential> {
    match reply.status {
        StatusCode::OK => ApiResponse::from_reply(reply),
        status if status.is_success() => ApiResponse::failure(
            status,
            FailureKind::UnexpectedStatus,
            format!("expected 200 OK, got {status}"),
        ),
        status => ApiResponse::failure(status, FailureKind::for_status(status), error_message(status, reply.body)),
    }
}
