//! Process-wide holder of the current credential

use crate::error::ClientError;
use crate::response::ApiResponse;
use crate::types::{Credential, SessionState};
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tracing::{debug, info};

/// Owns the authoritative current credential
///
/// Create one at startup and share it (it is cheap to clone). Replacement is
/// always wholesale, so readers never observe a half-updated credential.
#[derive(Clone, Default)]
pub struct SessionHolder {
    current: Arc<ArcSwapOption<Credential>>,
}

impl SessionHolder {
    /// Create an anonymous session
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        let holder = Self::new();
        holder.replace(Some(credential));
        holder
    }

    /// Current credential, if any
    pub fn read(&self) -> Option<Arc<Credential>> {
        self.current.load_full()
    }

    /// Replace the current credential; `None` ends the session
    pub fn replace(&self, credential: Option<Credential>) {
        match &credential {
            Some(credential) => debug!(username = %credential.username(), "Session credential replaced"),
            None => debug!("Session cleared"),
        }
        self.current.store(credential.map(Arc::new));
    }

    pub fn logout(&self) {
        info!("Logged out");
        self.replace(None);
    }

    pub fn state(&self) -> SessionState {
        SessionState::of(self.read().as_deref())
    }

    /// Store the credential renewed during an operation. Returns whether one was stored.
    pub fn absorb<T>(&self, response: &ApiResponse<T>) -> bool {
        self.store_renewed(response.renewed_credential())
    }

    /// Same as [`SessionHolder::absorb`] for an operation that ended in a local fault
    pub fn absorb_error(&self, error: &ClientError) -> bool {
        self.store_renewed(error.renewed_credential())
    }

    fn store_renewed(&self, renewed: Option<&Credential>) -> bool {
        match renewed {
            Some(credential) => {
                self.replace(Some(credential.clone()));
                true
            }
            None => false,
        }
    }
}
