//! TikTok login strategy.

use crate::options::ProviderOptions;
use crate::profile;
use async_trait::async_trait;
use identity_core::{Profile, Verify};
use identity_oauth2::pkce;
use identity_oauth2::{
    AuthorizationParams, Diagnostic, DiagnosticsSink, HttpOAuth2Client, OAuth2Client,
    OAuth2Error, OAuth2Result, OAuth2Strategy, RequestContext, TokenParams, TracingDiagnostics,
};
use std::sync::Arc;
use tracing::debug;
use url::Url;

pub const PROVIDER_NAME: &str = "tiktok";

/// Session field holding the verifier between authorization and callback.
pub const CODE_VERIFIER_KEY: &str = "tiktok_code_verifier";

/// TikTok OAuth2 strategy with optional PKCE.
///
/// The generic client performing the redirect and code exchange is injected;
/// this type only contributes the TikTok-specific hooks.
pub struct TikTokStrategy<U> {
    options: ProviderOptions,
    profile_url: Url,
    client: Arc<dyn OAuth2Client>,
    verify: Arc<dyn Verify<U>>,
    diagnostics: Arc<dyn DiagnosticsSink>,
}

impl<U: Send + 'static> TikTokStrategy<U> {
    /// Build the strategy with a reqwest-backed client for `options`.
    pub fn new(
        options: ProviderOptions,
        verify: impl Verify<U> + 'static,
    ) -> OAuth2Result<Self> {
        options.validate()?;
        let client = HttpOAuth2Client::new(options.client_config())?;
        Self::with_client(options, Arc::new(client), verify)
    }

    pub fn with_client(
        options: ProviderOptions,
        client: Arc<dyn OAuth2Client>,
        verify: impl Verify<U> + 'static,
    ) -> OAuth2Result<Self> {
        let profile_url = options.profile_request_url()?;

        Ok(Self {
            options,
            profile_url,
            client,
            verify: Arc::new(verify),
            diagnostics: Arc::new(TracingDiagnostics),
        })
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }
}

#[async_trait]
impl<U: Send + 'static> OAuth2Strategy for TikTokStrategy<U> {
    type User = U;

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn client(&self) -> &dyn OAuth2Client {
        self.client.as_ref()
    }

    fn verifier(&self) -> &dyn Verify<U> {
        self.verify.as_ref()
    }

    /// Mints a fresh verifier per call, stores it in the session and returns
    /// the S256 challenge. Without a session the challenge is still sent but
    /// the exchange will go out without a verifier.
    fn authorization_params(&self, ctx: &mut RequestContext<'_>) -> AuthorizationParams {
        let mut params = AuthorizationParams::new();
        if !self.options.use_pkce {
            return params;
        }

        let verifier = pkce::generate_verifier();
        match ctx.session_mut() {
            Some(session) => pkce::store_verifier(session, CODE_VERIFIER_KEY, &verifier),
            None => self.diagnostics.emit(Diagnostic::MissingVerifierStore {
                strategy: PROVIDER_NAME.to_string(),
            }),
        }

        let challenge = pkce::derive_challenge(&verifier);
        params.insert("code_challenge".to_string(), challenge.as_str().to_string());
        params.insert(
            "code_challenge_method".to_string(),
            self.options.code_challenge_method.to_string(),
        );
        params
    }

    /// Consumes the stored verifier. A missing verifier is not an error; the
    /// exchange proceeds without PKCE parameters.
    fn token_params(&self, ctx: &mut RequestContext<'_>) -> TokenParams {
        let mut params = TokenParams::new();
        if !self.options.use_pkce {
            return params;
        }

        match ctx
            .session_mut()
            .and_then(|session| pkce::take_verifier(session, CODE_VERIFIER_KEY))
        {
            Some(verifier) => {
                params.insert("code_verifier".to_string(), verifier.into_inner());
            }
            None => debug!("No PKCE verifier in session, exchanging code without it"),
        }
        params
    }

    fn pass_request_to_callback(&self) -> bool {
        self.options.pass_request_to_callback
    }

    async fn user_profile(&self, access_token: &str) -> OAuth2Result<Profile> {
        let body = self
            .client
            .get(self.profile_url.as_str(), access_token)
            .await
            .map_err(OAuth2Error::profile_fetch)?;

        let profile = profile::normalize(&body).map_err(OAuth2Error::ProfileParse)?;

        debug!(
            "Fetched TikTok profile, identifier present: {}",
            profile.id.is_some()
        );
        Ok(profile)
    }
}
