//! Type definitions for authentication

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role claim carried by a credential
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Bartender,
    /// Any role name the server issues that this client does not know about
    Other(String),
}

impl Role {
    /// Admin panel access (drink types, ingredients)
    pub fn can_administer(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Cocktail removal is open to bartenders as well
    pub fn can_remove_cocktails(&self) -> bool {
        matches!(self, Role::Admin | Role::Bartender)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "Admin",
            Role::Bartender => "Bartender",
            Role::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Admin" => Role::Admin,
            "Bartender" => Role::Bartender,
            _ => Role::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bearer credential issued by login, register or refresh
///
/// Immutable: a renewal always produces a new value. The token itself is
/// never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    token_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default)]
    username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    /// Unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    issued_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_in_secs: Option<u64>,
}

impl Credential {
    pub fn new(token_value: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token_value: token_value.into(),
            refresh_token: None,
            username: username.into(),
            role: None,
            issued_at: None,
            expires_in_secs: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_validity(mut self, issued_at: i64, expires_in_secs: u64) -> Self {
        self.issued_at = Some(issued_at);
        self.expires_in_secs = Some(expires_in_secs);
        self
    }

    /// Fill what a refresh answer left out from the credential it replaces
    pub(crate) fn inherit_from(mut self, previous: &Credential) -> Self {
        if self.refresh_token.is_none() {
            self.refresh_token = previous.refresh_token.clone();
        }
        if self.role.is_none() {
            self.role = previous.role.clone();
        }
        if self.username.is_empty() {
            self.username = previous.username.clone();
        }
        self
    }

    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Option<&Role> {
        self.role.as_ref()
    }

    pub fn issued_at(&self) -> Option<i64> {
        self.issued_at
    }

    /// Expiry instant in unix seconds, when the server supplied validity metadata.
    /// Informational only: the server alone decides whether the token is expired.
    pub fn expires_at(&self) -> Option<i64> {
        let expires_in = i64::try_from(self.expires_in_secs?).ok()?;
        self.issued_at?.checked_add(expires_in)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token_value", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("username", &self.username)
            .field("role", &self.role)
            .field("issued_at", &self.issued_at)
            .field("expires_in_secs", &self.expires_in_secs)
            .finish()
    }
}

/// Session state as observed through the held credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(Option<Role>),
}

impl SessionState {
    pub fn of(credential: Option<&Credential>) -> Self {
        match credential {
            Some(credential) => SessionState::Authenticated(credential.role().cloned()),
            None => SessionState::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}
