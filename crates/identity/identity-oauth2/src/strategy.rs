//! Provider strategies as hooks over the generic authorization-code flow.
//!
//! A strategy contributes three hooks: extra authorization parameters, extra
//! token parameters and profile retrieval. The provided [`OAuth2Strategy::authorize`]
//! and [`OAuth2Strategy::authenticate`] methods drive one login attempt through
//! the injected [`OAuth2Client`]:
//!
//! ```text
//! Init -> AuthRequested -> CallbackReceived -> TokenExchanged -> ProfileFetched -> Done
//! ```
//!
//! Every failure is reported as an [`AuthOutcome`], never as a panic.

use crate::client::OAuth2Client;
use crate::error::{OAuth2Error, OAuth2Result};
use crate::store::RequestContext;
use crate::types::{AuthorizationParams, TokenParams};
use async_trait::async_trait;
use identity_core::{CallbackRequest, Profile, Verification, Verify, VerifyRequest};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};
use url::Url;

/// Query parameters the provider sends back to the callback URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPhase {
    Init,
    AuthRequested,
    CallbackReceived,
    TokenExchanged,
    ProfileFetched,
    Done,
}

impl fmt::Display for LoginPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoginPhase::Init => "init",
            LoginPhase::AuthRequested => "auth_requested",
            LoginPhase::CallbackReceived => "callback_received",
            LoginPhase::TokenExchanged => "token_exchanged",
            LoginPhase::ProfileFetched => "profile_fetched",
            LoginPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Completion of one login attempt.
#[derive(Debug)]
pub enum AuthOutcome<U> {
    /// The verification callback accepted the login.
    Success(U),
    /// The user denied access or the verification callback rejected the login.
    Fail { reason: Option<String> },
    /// The attempt failed; `phase` is the last phase it reached.
    Error {
        phase: LoginPhase,
        error: OAuth2Error,
    },
}

impl<U> AuthOutcome<U> {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success(_))
    }

    pub fn user(self) -> Option<U> {
        match self {
            AuthOutcome::Success(user) => Some(user),
            _ => None,
        }
    }
}

#[async_trait]
pub trait OAuth2Strategy: Send + Sync {
    type User: Send + 'static;

    /// Provider tag, e.g. `"tiktok"`.
    fn name(&self) -> &str;

    fn client(&self) -> &dyn OAuth2Client;

    fn verifier(&self) -> &dyn Verify<Self::User>;

    /// Called exactly once per attempt, before redirecting to the provider.
    fn authorization_params(&self, _ctx: &mut RequestContext<'_>) -> AuthorizationParams {
        AuthorizationParams::new()
    }

    /// Called exactly once per callback, before the code exchange.
    fn token_params(&self, _ctx: &mut RequestContext<'_>) -> TokenParams {
        TokenParams::new()
    }

    async fn user_profile(&self, access_token: &str) -> OAuth2Result<Profile>;

    /// Whether the verification callback also receives the request's session.
    fn pass_request_to_callback(&self) -> bool {
        false
    }

    /// Start an attempt: compute the extra parameters and build the redirect URL.
    fn authorize(&self, ctx: &mut RequestContext<'_>) -> OAuth2Result<Url> {
        let params = self.authorization_params(ctx);
        let url = self.client().authorization_url(&params)?;

        info!("Started {} login, phase {}", self.name(), LoginPhase::AuthRequested);
        Ok(url)
    }

    /// Finish an attempt from the provider's callback parameters.
    async fn authenticate(
        &self,
        ctx: &mut RequestContext<'_>,
        callback: CallbackParams,
    ) -> AuthOutcome<Self::User> {
        if let Some(error) = callback.error {
            if error == "access_denied" {
                info!("{} login denied by user", self.name());
                return AuthOutcome::Fail {
                    reason: callback.error_description.or(Some(error)),
                };
            }

            let description = callback
                .error_description
                .as_deref()
                .unwrap_or("No description");
            return AuthOutcome::Error {
                phase: LoginPhase::CallbackReceived,
                error: OAuth2Error::CallbackError(format!("{}: {}", error, description)),
            };
        }

        let Some(code) = callback.code else {
            return AuthOutcome::Error {
                phase: LoginPhase::CallbackReceived,
                error: OAuth2Error::MissingAuthorizationCode,
            };
        };

        let params = self.token_params(ctx);

        // Taken after the token hook so a consumed verifier is not handed out.
        let request = if self.pass_request_to_callback() {
            ctx.session().map(|session| CallbackRequest::new(session.values()))
        } else {
            None
        };
        debug!(
            "Exchanging {} authorization code with {} extra parameter(s)",
            self.name(),
            params.len()
        );

        let tokens = match self.client().exchange_code(&code, &params).await {
            Ok(tokens) => tokens,
            Err(error) => {
                warn!("{} token exchange failed: {}", self.name(), error);
                return AuthOutcome::Error {
                    phase: LoginPhase::CallbackReceived,
                    error,
                };
            }
        };

        let profile = match self.user_profile(&tokens.access_token).await {
            Ok(profile) => profile,
            Err(error) => {
                warn!("{} profile retrieval failed: {}", self.name(), error);
                return AuthOutcome::Error {
                    phase: LoginPhase::TokenExchanged,
                    error,
                };
            }
        };

        let request = VerifyRequest {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            profile,
            request,
        };

        match self.verifier().verify(request).await {
            Ok(Verification::Accepted(user)) => {
                info!("{} login completed, phase {}", self.name(), LoginPhase::Done);
                AuthOutcome::Success(user)
            }
            Ok(Verification::Rejected { reason }) => {
                info!("{} login rejected by verification callback", self.name());
                AuthOutcome::Fail { reason }
            }
            Err(error) => AuthOutcome::Error {
                phase: LoginPhase::ProfileFetched,
                error: error.into(),
            },
        }
    }
}
