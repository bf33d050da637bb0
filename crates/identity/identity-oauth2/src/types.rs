//! OAuth2 protocol types.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Extra request parameters contributed by a strategy hook.
pub type ExtraParams = BTreeMap<String, String>;

/// Extra query parameters for the authorization redirect.
pub type AuthorizationParams = ExtraParams;

/// Extra form parameters for the code-for-token exchange.
pub type TokenParams = ExtraParams;

/// OAuth2 token response
///
/// Besides the RFC 6749 fields this keeps the fields TikTok adds to its token
/// response (`open_id`, `refresh_expires_in`); anything else lands in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
    pub refresh_token: Option<String>,
    pub refresh_expires_in: Option<u64>,
    pub scope: Option<String>,
    pub open_id: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_deserialize_rfc_fields() {
        let json = r#"{
            "access_token": "at",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "rt",
            "scope": "user.info.basic"
        }"#;

        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "at");
        assert_eq!(token.token_type.as_deref(), Some("Bearer"));
        assert_eq!(token.expires_in, Some(3600));
        assert_eq!(token.refresh_token.as_deref(), Some("rt"));
        assert!(token.open_id.is_none());
        assert!(token.extra.is_empty());
    }

    #[test]
    fn test_token_response_keeps_provider_fields() {
        let json = r#"{
            "access_token": "at",
            "open_id": "open-1",
            "refresh_expires_in": 86400,
            "log_id": "2024"
        }"#;

        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.open_id.as_deref(), Some("open-1"));
        assert_eq!(token.refresh_expires_in, Some(86400));
        assert_eq!(token.extra.get("log_id").unwrap(), "2024");
    }
}
