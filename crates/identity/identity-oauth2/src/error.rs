//! OAuth2 error types.

use thiserror::Error;

pub type OAuth2Result<T> = Result<T, OAuth2Error>;

#[derive(Debug, Error)]
pub enum OAuth2Error {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP request returned status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Missing authorization code")]
    MissingAuthorizationCode,

    #[error("Callback error: {0}")]
    CallbackError(String),

    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    /// The user-info request failed at the transport level.
    #[error("Failed to fetch profile: {0}")]
    ProfileFetch(#[source] Box<OAuth2Error>),

    /// The user-info response body was not valid JSON.
    #[error("Failed to parse profile: {0}")]
    ProfileParse(#[source] serde_json::Error),

    #[error("Verification failed: {0}")]
    Verify(#[from] identity_core::IdentityError),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Session error: {0}")]
    SessionError(String),
}

impl OAuth2Error {
    pub fn profile_fetch(err: OAuth2Error) -> Self {
        Self::ProfileFetch(Box::new(err))
    }
}
