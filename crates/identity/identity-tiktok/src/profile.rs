//! Normalization of TikTok `/v2/user/info/` responses.
//!
//! The response nests the user under `data.user`:
//!
//! ```json
//! {"data": {"user": {"open_id": "...", "union_id": "...", "display_name": "...", "avatar_url": "..."}}}
//! ```
//!
//! Missing or mistyped fields become `None`; only a body that is not JSON at all
//! is an error.

use crate::strategy::PROVIDER_NAME;
use identity_core::Profile;
use serde_json::Value;

pub fn normalize(raw: &str) -> Result<Profile, serde_json::Error> {
    let json: Value = serde_json::from_str(raw)?;
    Ok(normalize_json(raw.to_string(), json))
}

pub fn normalize_json(raw: String, json: Value) -> Profile {
    let user = json.get("data").and_then(|data| data.get("user"));
    let field = |name: &str| user.and_then(|user| user.get(name)).and_then(text);

    // open_id is scoped to this app, union_id to the developer account
    let id = field("open_id")
        .filter(|id| !id.is_empty())
        .or_else(|| field("union_id").filter(|id| !id.is_empty()));
    let display_name = field("display_name");
    let profile_image = field("avatar_url");

    let mut profile = Profile::new(PROVIDER_NAME, raw, json);
    profile.id = id;
    profile.username = display_name.clone();
    profile.display_name = display_name;
    profile.profile_image = profile_image;
    profile
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_full_user() {
        let raw = r#"{"data":{"user":{"open_id":"123","union_id":"union-123","display_name":"Test User","avatar_url":"https://example.com/avatar.jpg"}}}"#;

        let profile = normalize(raw).unwrap();
        assert_eq!(profile.provider, "tiktok");
        assert_eq!(profile.id.as_deref(), Some("123"));
        assert_eq!(profile.display_name.as_deref(), Some("Test User"));
        assert_eq!(profile.username.as_deref(), Some("Test User"));
        assert_eq!(
            profile.profile_image.as_deref(),
            Some("https://example.com/avatar.jpg")
        );
        assert_eq!(profile.raw, raw);
        assert_eq!(profile.json["data"]["user"]["union_id"], "union-123");
    }

    #[test]
    fn test_union_id_fallback() {
        let raw = r#"{"data":{"user":{"union_id":"union-123","display_name":"Test User"}}}"#;
        assert_eq!(normalize(raw).unwrap().id.as_deref(), Some("union-123"));

        let raw = r#"{"data":{"user":{"open_id":"","union_id":"union-123"}}}"#;
        assert_eq!(normalize(raw).unwrap().id.as_deref(), Some("union-123"));
    }

    #[test]
    fn test_missing_user_yields_empty_profile() {
        for raw in [
            r#"{}"#,
            r#"{"data":{}}"#,
            r#"{"data":null}"#,
            r#"{"data":{"user":null}}"#,
            r#"[]"#,
            r#""just a string""#,
        ] {
            let profile = normalize(raw).unwrap();
            assert_eq!(profile.provider, "tiktok");
            assert!(profile.id.is_none(), "{raw}");
            assert!(profile.display_name.is_none(), "{raw}");
            assert!(profile.username.is_none(), "{raw}");
            assert!(profile.profile_image.is_none(), "{raw}");
        }
    }

    #[test]
    fn test_error_envelope_is_kept_in_json() {
        let raw = r#"{"data":{},"error":{"code":"access_token_invalid","message":"","log_id":"1"}}"#;
        let profile = normalize(raw).unwrap();
        assert!(profile.id.is_none());
        assert_eq!(profile.json["error"]["code"], "access_token_invalid");
    }

    #[test]
    fn test_numeric_identifier_is_stringified() {
        let raw = r#"{"data":{"user":{"open_id":42}}}"#;
        assert_eq!(normalize(raw).unwrap().id.as_deref(), Some("42"));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(normalize("<html>Bad Gateway</html>").is_err());
        assert!(normalize("").is_err());
    }
}
