//! Credential renewal and the retry-once combinator
//!
//! Every resource operation runs through [`Renewer::with_renewal`]: issue the
//! call, and if it comes back 401 while a credential was supplied, refresh that
//! credential once and repeat the call once with the new token. Nothing loops.

use crate::auth_client::IdentityClient;
use crate::config::RenewalPolicy;
use crate::error::{ClientError, Result};
use crate::transport::{Delivery, Transport, TransportError};
use crate::types::Credential;
use async_singleflight::Group;
use reqwest::StatusCode;
use std::future::Future;
use tracing::{debug, info, warn};

/// Final delivery of an operation plus the credential renewed on the way, if any
#[derive(Debug)]
pub(crate) struct Exchange {
    pub delivery: Delivery,
    pub renewed: Option<Credential>,
}

/// Renews expired credentials through the identity refresh route
pub struct Renewer<X> {
    identity: IdentityClient<X>,
    policy: RenewalPolicy,
    /// Only used with `RenewalPolicy::SingleFlight`, keyed by the expired token.
    /// Error type is String because singleflight requires a cloneable error.
    in_flight: Group<Credential, String>,
}

impl<X: Transport> Renewer<X> {
    pub fn new(identity: IdentityClient<X>, policy: RenewalPolicy) -> Self {
        Self {
            identity,
            policy,
            in_flight: Group::new(),
        }
    }

    pub fn identity(&self) -> &IdentityClient<X> {
        &self.identity
    }

    pub fn policy(&self) -> RenewalPolicy {
        self.policy
    }

    /// Exchange an expired credential for a new one.
    ///
    /// `None` means renewal failed: the refresh was rejected, returned no usable
    /// credential, or never got an answer.
    pub async fn renew(&self, expired: &Credential) -> Option<Credential> {
        match self.policy {
            RenewalPolicy::PerCall => self.refresh_once(expired).await.ok(),
            RenewalPolicy::SingleFlight => {
                let key = expired.token_value().to_string();
                let (renewed, error, shared) = self.in_flight.work(&key, self.refresh_once(expired)).await;

                debug!(shared = shared, failed = error.is_some(), "Single-flight renewal finished");
                renewed
            }
        }
    }

    async fn refresh_once(&self, expired: &Credential) -> std::result::Result<Credential, String> {
        match self.identity.refresh(expired).await {
            Ok(response) => {
                let status = response.status();
                match response.into_data() {
                    Some(credential) => {
                        let credential = credential.inherit_from(expired);
                        info!(username = %credential.username(), "Credential renewed");
                        Ok(credential)
                    }
                    None => {
                        warn!(status = %status, "Credential refresh rejected");
                        Err(format!("refresh rejected with status {status}"))
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Credential refresh failed");
                Err(e.to_string())
            }
        }
    }

    /// Run `call` with the caller's token, renewing and retrying once on 401.
    ///
    /// `call` receives the bearer token to send (`None` for anonymous calls) and
    /// must issue the identical request every time it is invoked.
    pub(crate) async fn with_renewal<F, Fut>(&self, credential: Option<&Credential>, call: F) -> Result<Exchange>
    where
        F: Fn(Option<String>) -> Fut,
        Fut: Future<Output = std::result::Result<Delivery, TransportError>>,
    {
        let first = call(credential.map(|c| c.token_value().to_string())).await?;
        if first.status() != StatusCode::UNAUTHORIZED {
            return Ok(Exchange {
                delivery: first,
                renewed: None,
            });
        }

        let Some(expired) = credential else {
            debug!("Unauthorized without a credential, nothing to renew");
            return Ok(Exchange {
                delivery: first,
                renewed: None,
            });
        };

        let Some(renewed) = self.renew(expired).await else {
            warn!("Renewal failed, reporting the original 401");
            return Ok(Exchange {
                delivery: first,
                renewed: None,
            });
        };

        match call(Some(renewed.token_value().to_string())).await {
            Ok(delivery) => {
                debug!(status = %delivery.status(), "Retried with renewed credential");
                Ok(Exchange {
                    delivery,
                    renewed: Some(renewed),
                })
            }
            Err(source) => Err(ClientError::TransportAfterRenewal {
                renewed: Box::new(renewed),
                source,
            }),
        }
    }
}
