//! Entry point tying transport, identity and resource clients together

use crate::auth_client::IdentityClient;
use crate::catalog::{Cocktail, DrinkType, Ingredient};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::renewal::Renewer;
use crate::resource::{Resource, ResourceClient};
use crate::transport::{HttpTransport, Transport};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// API client for one server
///
/// Holds no credential: callers pass the current one from their
/// [`crate::SessionHolder`] to each operation. Cloning is cheap and all clones
/// share one transport and one renewer.
pub struct ApiClient<X = HttpTransport> {
    renewer: Arc<Renewer<X>>,
}

impl<X> Clone for ApiClient<X> {
    fn clone(&self) -> Self {
        Self {
            renewer: Arc::clone(&self.renewer),
        }
    }
}

impl ApiClient<HttpTransport> {
    /// Create a client talking HTTP to `config.base_url`
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        info!(
            base_url = %transport.base_url(),
            timeout_secs = ?config.timeout_secs,
            renewal = ?config.renewal,
            "Created API client"
        );
        Ok(Self::with_transport(Arc::new(transport), &config))
    }
}

impl<X: Transport> ApiClient<X> {
    /// Create a client over any transport; `base_url` and `timeout_secs` are not used here
    pub fn with_transport(transport: Arc<X>, config: &ClientConfig) -> Self {
        let identity = IdentityClient::new(transport, config.routes.clone());
        Self {
            renewer: Arc::new(Renewer::new(identity, config.renewal)),
        }
    }

    pub fn identity(&self) -> &IdentityClient<X> {
        self.renewer.identity()
    }

    pub fn renewer(&self) -> &Renewer<X> {
        &self.renewer
    }

    pub fn resource<T: Resource>(&self) -> ResourceClient<T, X> {
        ResourceClient::for_resource(Arc::clone(&self.renewer))
    }

    /// Client for an entity type served under an arbitrary path
    pub fn resource_at<T>(&self, path: &str) -> ResourceClient<T, X>
    where
        T: Serialize + DeserializeOwned,
    {
        ResourceClient::new(path, Arc::clone(&self.renewer))
    }

    pub fn cocktails(&self) -> ResourceClient<Cocktail, X> {
        self.resource()
    }

    pub fn ingredients(&self) -> ResourceClient<Ingredient, X> {
        self.resource()
    }

    pub fn drink_types(&self) -> ResourceClient<DrinkType, X> {
        self.resource()
    }
}
