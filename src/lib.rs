//! Pocket Bar Rust Client
//!
//! A client library for the Pocket Bar drink catalog API: login, register,
//! and CRUD over cocktails, ingredients and drink types, with transparent
//! bearer token renewal on expiry.
//!
//! Every operation takes the caller's current credential and returns an
//! [`ApiResponse`]. When a call hits 401 with a credential, the client refreshes
//! the credential once, retries the call once, and puts the renewed credential
//! in the response for the caller to store in its [`SessionHolder`].

pub mod auth_client;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod mock;
pub mod renewal;
pub mod resource;
pub mod response;
pub mod session;
pub mod transport;
pub mod types;

pub use auth_client::{IdentityClient, LoginRequest, RegisterRequest};
pub use catalog::{Cocktail, CocktailDrink, CocktailIngredient, CocktailStep, DrinkType, Ingredient, LocalizedText};
pub use client::ApiClient;
pub use config::{ClientConfig, IdentityRoutes, RenewalPolicy};
pub use error::{ClientError, Result};
pub use renewal::Renewer;
pub use resource::{Resource, ResourceClient};
pub use response::{ApiResponse, Failure, FailureKind, Outcome};
pub use session::SessionHolder;
pub use transport::{HttpReply, HttpRequest, HttpTransport, Transport, TransportError, TransportFault};
pub use types::{Credential, Role, SessionState};
