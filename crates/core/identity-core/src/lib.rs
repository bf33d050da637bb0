//! Core identity types shared by OAuth2 login strategies.
//!
//! A strategy turns a provider login into a [`Profile`] and hands it, together
//! with the tokens it obtained, to a host-supplied [`Verify`] callback which
//! decides whether the login maps to an application user.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use thiserror::Error;

/// Errors a verification callback can return.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type IdentityResult<T> = Result<T, IdentityError>;

/// Canonical user profile produced by a provider strategy.
///
/// `raw` and `json` keep the provider response around for consumers that need
/// provider-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub provider: String,
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub username: Option<String>,
    pub profile_image: Option<String>,
    pub raw: String,
    pub json: serde_json::Value,
}

impl Profile {
    /// Empty profile for `provider`, used as the base of normalization.
    pub fn new(provider: impl Into<String>, raw: String, json: serde_json::Value) -> Self {
        Self {
            provider: provider.into(),
            id: None,
            display_name: None,
            username: None,
            profile_image: None,
            raw,
            json,
        }
    }
}

/// Per-request state handed to the verification callback when the strategy is
/// configured to pass it along.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallbackRequest {
    /// Read-only copy of the session values at callback time.
    pub session: HashMap<String, String>,
}

impl CallbackRequest {
    pub fn new(session: HashMap<String, String>) -> Self {
        Self { session }
    }

    pub fn session_value(&self, key: &str) -> Option<&str> {
        self.session.get(key).map(String::as_str)
    }
}

/// Everything the verification callback gets to see after a successful login.
#[derive(Debug, Clone)]
pub struct VerifyRequest {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub profile: Profile,
    /// Present only when the strategy passes the request to the callback.
    pub request: Option<CallbackRequest>,
}

/// Result of the verification callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification<U> {
    Accepted(U),
    Rejected { reason: Option<String> },
}

impl<U> Verification<U> {
    pub fn accept(user: U) -> Self {
        Self::Accepted(user)
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: Some(reason.into()),
        }
    }
}

/// Host-supplied verification callback.
///
/// The strategy never interprets the returned user; it only propagates it.
#[async_trait]
pub trait Verify<U>: Send + Sync {
    async fn verify(&self, request: VerifyRequest) -> IdentityResult<Verification<U>>;
}

#[async_trait]
impl<F, Fut, U> Verify<U> for F
where
    F: Fn(VerifyRequest) -> Fut + Send + Sync,
    Fut: Future<Output = IdentityResult<Verification<U>>> + Send + 'static,
    U: Send + 'static,
{
    async fn verify(&self, request: VerifyRequest) -> IdentityResult<Verification<U>> {
        (self)(request).await
    }
}
