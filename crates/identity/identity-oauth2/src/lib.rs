//! Generic OAuth2 authorization-code client with PKCE support.
//!
//! This crate provides the provider-independent half of a login strategy: PKCE
//! verifier/challenge handling, the per-request [`VerifierStore`] through which
//! the verifier travels from the authorization request to the callback, a
//! reqwest-backed [`OAuth2Client`], and the [`OAuth2Strategy`] trait whose hooks
//! a provider crate implements.

pub mod crypto;
pub mod pkce;

mod client;
mod config;
mod diagnostics;
mod error;
mod session;
mod store;
mod strategy;
mod types;


pub use client::{HttpOAuth2Client, OAuth2Client};
pub use config::ClientConfig;
pub use diagnostics::{CollectingDiagnostics, Diagnostic, DiagnosticsSink, TracingDiagnostics};
pub use error::{OAuth2Error, OAuth2Result};
pub use pkce::{ChallengeMethod, CodeChallenge, CodeVerifier};
pub use session::{InMemorySessionStore, Session, SessionStore};
pub use store::{RequestContext, VerifierStore};
pub use strategy::{AuthOutcome, CallbackParams, LoginPhase, OAuth2Strategy};
pub use types::{AuthorizationParams, ExtraParams, TokenParams, TokenResponse};

// Re-export common types for convenience
pub use identity_core::{
    CallbackRequest, IdentityError, Profile, Verification, Verify, VerifyRequest,
};
