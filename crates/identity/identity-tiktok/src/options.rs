//! TikTok strategy configuration.

use identity_oauth2::{ChallengeMethod, ClientConfig, OAuth2Error, OAuth2Result};
use serde::{Deserialize, Serialize};
use url::Url;

pub const TIKTOK_AUTH_URL: &str = "https://www.tiktok.com/v2/auth/authorize/";
pub const TIKTOK_TOKEN_URL: &str = "https://open.tiktokapis.com/v2/oauth/token/";
pub const TIKTOK_PROFILE_URL: &str = "https://open.tiktokapis.com/v2/user/info/";

/// Fields requested from the user-info endpoint, the ones the normalizer reads.
pub const DEFAULT_PROFILE_FIELDS: [&str; 4] =
    ["open_id", "union_id", "avatar_url", "display_name"];

fn default_scope() -> Vec<String> {
    vec!["user.info.basic".to_string()]
}

fn default_scope_separator() -> String {
    " ".to_string()
}

fn default_authorization_url() -> String {
    TIKTOK_AUTH_URL.to_string()
}

fn default_token_url() -> String {
    TIKTOK_TOKEN_URL.to_string()
}

fn default_profile_url() -> String {
    TIKTOK_PROFILE_URL.to_string()
}

fn default_profile_fields() -> Vec<String> {
    DEFAULT_PROFILE_FIELDS.iter().map(|f| f.to_string()).collect()
}

fn default_http_timeout_seconds() -> u64 {
    30
}

/// Options fixed when the strategy is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderOptions {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    #[serde(default = "default_scope")]
    pub scope: Vec<String>,
    #[serde(default = "default_scope_separator")]
    pub scope_separator: String,
    #[serde(default = "default_authorization_url")]
    pub authorization_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_profile_url")]
    pub profile_url: String,
    /// Sent as the `fields` query parameter of the profile request
    #[serde(default = "default_profile_fields")]
    pub profile_fields: Vec<String>,
    #[serde(default)]
    pub use_pkce: bool,
    #[serde(default)]
    pub code_challenge_method: ChallengeMethod,
    /// Hand a copy of the request's session to the verification callback
    #[serde(default)]
    pub pass_request_to_callback: bool,
    #[serde(default = "default_http_timeout_seconds")]
    pub http_timeout_seconds: u64,
}

impl ProviderOptions {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            callback_url: callback_url.into(),
            scope: default_scope(),
            scope_separator: default_scope_separator(),
            authorization_url: default_authorization_url(),
            token_url: default_token_url(),
            profile_url: default_profile_url(),
            profile_fields: default_profile_fields(),
            use_pkce: false,
            code_challenge_method: ChallengeMethod::default(),
            pass_request_to_callback: false,
            http_timeout_seconds: default_http_timeout_seconds(),
        }
    }

    pub fn with_scope(mut self, scope: Vec<String>) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_authorization_url(mut self, url: impl Into<String>) -> Self {
        self.authorization_url = url.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_profile_url(mut self, url: impl Into<String>) -> Self {
        self.profile_url = url.into();
        self
    }

    pub fn with_profile_fields(mut self, fields: Vec<String>) -> Self {
        self.profile_fields = fields;
        self
    }

    pub fn with_pkce(mut self, enabled: bool) -> Self {
        self.use_pkce = enabled;
        self
    }

    pub fn with_pass_request_to_callback(mut self, enabled: bool) -> Self {
        self.pass_request_to_callback = enabled;
        self
    }

    pub fn with_http_timeout(mut self, seconds: u64) -> Self {
        self.http_timeout_seconds = seconds;
        self
    }

    pub fn validate(&self) -> OAuth2Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(OAuth2Error::ConfigError("client_id is required".to_string()));
        }
        if self.client_secret.trim().is_empty() {
            return Err(OAuth2Error::ConfigError(
                "client_secret is required".to_string(),
            ));
        }
        if self.callback_url.trim().is_empty() {
            return Err(OAuth2Error::ConfigError(
                "callback_url is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Configuration for the generic client performing redirect and code exchange.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(
            &self.client_id,
            &self.client_secret,
            &self.authorization_url,
            &self.token_url,
            &self.callback_url,
        )
        .with_scopes(self.scope.clone())
        .with_scope_separator(&self.scope_separator)
        .with_http_timeout(self.http_timeout_seconds)
    }

    /// Profile URL with the `fields` selector added unless the override already has one.
    pub fn profile_request_url(&self) -> OAuth2Result<Url> {
        let mut url = Url::parse(&self.profile_url)?;

        let has_fields = url.query_pairs().any(|(key, _)| key == "fields");
        if !has_fields && !self.profile_fields.is_empty() {
            url.query_pairs_mut()
                .append_pair("fields", &self.profile_fields.join(","));
        }

        Ok(url)
    }
}
