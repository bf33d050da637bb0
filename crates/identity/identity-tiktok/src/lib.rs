//! TikTok login strategy.
//!
//! Adds three TikTok-specific hooks to the generic authorization-code flow of
//! `identity-oauth2`:
//!
//! - authorization parameters, carrying a PKCE S256 challenge when enabled,
//! - token parameters, carrying the matching `code_verifier`,
//! - profile retrieval from `/v2/user/info/`, normalized into a [`Profile`].
//!
//! ```rust,ignore
//! use identity_oauth2::{OAuth2Strategy, RequestContext, Session, Verification};
//! use identity_tiktok::{ProviderOptions, TikTokStrategy};
//!
//! let options = ProviderOptions::new(client_id, client_secret, callback_url).with_pkce(true);
//! let strategy = TikTokStrategy::new(options, |request: VerifyRequest| async move {
//!     Ok(Verification::accept(request.profile))
//! })?;
//!
//! // GET /auth/tiktok
//! let redirect = strategy.authorize(&mut RequestContext::with_session(&mut session))?;
//!
//! // GET /auth/tiktok/callback
//! let outcome = strategy
//!     .authenticate(&mut RequestContext::with_session(&mut session), callback)
//!     .await;
//! ```

mod options;
mod profile;
mod strategy;


pub use options::{
    DEFAULT_PROFILE_FIELDS, ProviderOptions, TIKTOK_AUTH_URL, TIKTOK_PROFILE_URL,
    TIKTOK_TOKEN_URL,
};
pub use profile::{normalize, normalize_json};
pub use strategy::{CODE_VERIFIER_KEY, PROVIDER_NAME, TikTokStrategy};

// Re-export common types for convenience
pub use identity_core::{CallbackRequest, Profile, Verification, VerifyRequest};
pub use identity_oauth2::{AuthOutcome, CallbackParams, OAuth2Strategy, RequestContext};
