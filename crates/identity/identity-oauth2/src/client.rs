//! OAuth2 client implementation.

use crate::config::ClientConfig;
use crate::error::{OAuth2Error, OAuth2Result};
use crate::types::{AuthorizationParams, TokenParams, TokenResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// The generic authorization-code mechanics a strategy builds on.
#[async_trait]
pub trait OAuth2Client: Send + Sync {
    fn config(&self) -> &ClientConfig;

    /// Authorization redirect URL with the strategy's extra parameters appended.
    fn authorization_url(&self, extra: &AuthorizationParams) -> OAuth2Result<Url>;

    /// Exchange an authorization code for tokens.
    async fn exchange_code(&self, code: &str, extra: &TokenParams) -> OAuth2Result<TokenResponse>;

    /// Authenticated GET returning the raw response body.
    async fn get(&self, url: &str, access_token: &str) -> OAuth2Result<String>;
}

/// reqwest-backed [`OAuth2Client`]
#[derive(Clone)]
pub struct HttpOAuth2Client {
    http_client: Client,
    config: ClientConfig,
}

impl HttpOAuth2Client {
    pub fn new(config: ClientConfig) -> OAuth2Result<Self> {
        config.validate()?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }
}

#[async_trait]
impl OAuth2Client for HttpOAuth2Client {
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn authorization_url(&self, extra: &AuthorizationParams) -> OAuth2Result<Url> {
        let mut url = Url::parse(&self.config.authorization_endpoint)?;

        {
            let mut params = url.query_pairs_mut();
            params.append_pair("response_type", "code");
            params.append_pair("client_id", &self.config.client_id);
            params.append_pair("redirect_uri", &self.config.redirect_uri);

            if let Some(scope) = self.config.scope() {
                params.append_pair("scope", &scope);
            }

            for (key, value) in extra {
                params.append_pair(key, value);
            }
        }

        debug!(
            "Generated authorization URL for endpoint {}",
            self.config.authorization_endpoint
        );

        Ok(url)
    }

    async fn exchange_code(&self, code: &str, extra: &TokenParams) -> OAuth2Result<TokenResponse> {
        let mut params: Vec<(&str, &str)> = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        params.extend(extra.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let response = self
            .http_client
            .post(&self.config.token_endpoint)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Token exchange failed: {}", error_text);
            return Err(OAuth2Error::TokenExchangeFailed(error_text));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuth2Error::InvalidTokenResponse(e.to_string()))?;

        info!("Successfully exchanged code for tokens");
        Ok(token_response)
    }

    async fn get(&self, url: &str, access_token: &str) -> OAuth2Result<String> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("GET {} returned {}", url, status);
            return Err(OAuth2Error::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}
