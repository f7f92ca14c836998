//! Generic CRUD client for one server resource
//!
//! | operation | verb   | route         | success data  |
//! |-----------|--------|---------------|---------------|
//! | `add`     | POST   | `/path`       | created entity, if the server echoes it |
//! | `get_all` | GET    | `/path`       | list, body required |
//! | `get`     | GET    | `/path/{id}`  | entity, body required |
//! | `update`  | PUT    | `/path/{id}`  | none |
//! | `remove`  | DELETE | `/path/{id}`  | none |
//!
//! Each operation takes the caller's current credential, never stores it, and
//! hands back a renewed one in the response when a 401 forced a refresh.

use crate::error::Result;
use crate::renewal::Renewer;
use crate::response::ApiResponse;
use crate::transport::{deliver, HttpReply, HttpRequest, Transport};
use crate::types::Credential;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Entity served under a fixed path segment
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Path segment without slashes, e.g. `cocktails`
    const PATH: &'static str;
}

pub struct ResourceClient<T, X> {
    /// Always `/segment`
    path: String,
    renewer: Arc<Renewer<X>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T, X> Clone for ResourceClient<T, X> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            renewer: Arc::clone(&self.renewer),
            _entity: PhantomData,
        }
    }
}

impl<T: Resource, X: Transport> ResourceClient<T, X> {
    pub fn for_resource(renewer: Arc<Renewer<X>>) -> Self {
        Self::new(T::PATH, renewer)
    }
}

impl<T, X> ResourceClient<T, X>
where
    T: Serialize + DeserializeOwned,
    X: Transport,
{
    pub fn new(path: &str, renewer: Arc<Renewer<X>>) -> Self {
        Self {
            path: format!("/{}", path.trim_matches('/')),
            renewer,
            _entity: PhantomData,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// POST a new entity. Data is the created entity when the server returns one.
    pub async fn add(&self, entity: &T, credential: Option<&Credential>) -> Result<ApiResponse<Option<T>>> {
        let request = HttpRequest::new(Method::POST, self.path.as_str()).with_body(serde_json::to_value(entity)?);
        self.execute(request, credential, ApiResponse::from_optional_reply).await
    }

    pub async fn update(&self, id: &str, entity: &T, credential: Option<&Credential>) -> Result<ApiResponse<()>> {
        let request = HttpRequest::new(Method::PUT, self.item_path(id)).with_body(serde_json::to_value(entity)?);
        self.execute(request, credential, ApiResponse::from_bodiless_reply).await
    }

    pub async fn remove(&self, id: &str, credential: Option<&Credential>) -> Result<ApiResponse<()>> {
        let request = HttpRequest::new(Method::DELETE, self.item_path(id));
        self.execute(request, credential, ApiResponse::from_bodiless_reply).await
    }

    pub async fn get_all(&self, credential: Option<&Credential>) -> Result<ApiResponse<Vec<T>>> {
        let request = HttpRequest::new(Method::GET, self.path.as_str());
        self.execute(request, credential, ApiResponse::from_reply).await
    }

    pub async fn get(&self, id: &str, credential: Option<&Credential>) -> Result<ApiResponse<T>> {
        let request = HttpRequest::new(Method::GET, self.item_path(id));
        self.execute(request, credential, ApiResponse::from_reply).await
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path, id)
    }

    async fn execute<R>(
        &self,
        request: HttpRequest,
        credential: Option<&Credential>,
        on_reply: fn(HttpReply) -> ApiResponse<R>,
    ) -> Result<ApiResponse<R>> {
        let transport = self.renewer.identity().transport();
        let method = request.method.clone();

        let exchange = self
            .renewer
            .with_renewal(credential, |bearer| deliver(transport, request.clone().with_bearer(bearer)))
            .await?;

        let response = ApiResponse::settle(exchange.delivery, on_reply).with_renewed(exchange.renewed);
        debug!(
            method = %method,
            path = %request.path,
            status = %response.status(),
            success = response.is_success(),
            renewed = response.renewed_credential().is_some(),
            "Resource operation finished"
        );
        Ok(response)
    }
}
