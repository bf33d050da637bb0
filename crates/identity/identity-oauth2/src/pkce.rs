//! PKCE (RFC 7636) verifier generation, challenge derivation and verifier threading
//! between the authorization request and the token exchange.

use crate::crypto::{sha256, url_safe_base64_encode};
use crate::store::VerifierStore;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Random bytes drawn per verifier; encodes to 43 characters.
pub const VERIFIER_BYTES: usize = 32;

const MIN_VERIFIER_LEN: usize = 43;
const MAX_VERIFIER_LEN: usize = 128;

/// PKCE challenge method. Only S256 is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChallengeMethod {
    #[default]
    S256,
}

impl ChallengeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeMethod::S256 => "S256",
        }
    }
}

impl fmt::Display for ChallengeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PKCE code verifier. Secret; its `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct CodeVerifier(String);

impl CodeVerifier {
    /// Generate a fresh verifier from a cryptographically secure RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; VERIFIER_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(url_safe_base64_encode(bytes))
    }

    /// Accept a verifier read back from storage if it is well formed.
    pub fn parse(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let valid_len = (MIN_VERIFIER_LEN..=MAX_VERIFIER_LEN).contains(&value.len());
        let valid_chars = value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'));

        (valid_len && valid_chars).then_some(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn challenge(&self) -> CodeChallenge {
        CodeChallenge::from_verifier(self)
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for CodeVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CodeVerifier(<redacted>)")
    }
}

/// PKCE code challenge, `base64url(sha256(verifier))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeChallenge(String);

impl CodeChallenge {
    pub fn from_verifier(verifier: &CodeVerifier) -> Self {
        Self(url_safe_base64_encode(sha256(verifier.as_str().as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn generate_verifier() -> CodeVerifier {
    CodeVerifier::generate()
}

pub fn derive_challenge(verifier: &CodeVerifier) -> CodeChallenge {
    verifier.challenge()
}

/// Write `verifier` under `key`, replacing any verifier of an earlier attempt.
pub fn store_verifier<S>(store: &mut S, key: &str, verifier: &CodeVerifier)
where
    S: VerifierStore + ?Sized,
{
    store.set(key, verifier.as_str().to_string());
}

/// Read the verifier under `key` without consuming it.
pub fn retrieve_verifier<S>(store: &S, key: &str) -> Option<CodeVerifier>
where
    S: VerifierStore + ?Sized,
{
    store.get(key).and_then(CodeVerifier::parse)
}

/// Remove and return the verifier under `key`. A verifier is good for one exchange.
pub fn take_verifier<S>(store: &mut S, key: &str) -> Option<CodeVerifier>
where
    S: VerifierStore + ?Sized,
{
    store.remove(key).and_then(CodeVerifier::parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    const KEY: &str = "test_code_verifier";

    #[test]
    fn test_verifier_generation() {
        let verifier = CodeVerifier::generate();
        assert_eq!(verifier.as_str().len(), 43);
        assert!(CodeVerifier::parse(verifier.as_str()).is_some());
    }

    #[test]
    fn test_verifiers_do_not_collide() {
        let samples: HashSet<String> = (0..1000)
            .map(|_| generate_verifier().into_inner())
            .collect();
        assert_eq!(samples.len(), 1000);
    }

    #[test]
    fn test_challenge_matches_rfc7636_vector() {
        let verifier = CodeVerifier::parse("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk").unwrap();
        assert_eq!(
            derive_challenge(&verifier).as_str(),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_challenge_deterministic() {
        let verifier = generate_verifier();
        assert_eq!(derive_challenge(&verifier), derive_challenge(&verifier));
    }

    #[test]
    fn test_parse_rejects_malformed_verifiers() {
        assert!(CodeVerifier::parse("short").is_none());
        assert!(CodeVerifier::parse("a".repeat(129)).is_none());
        assert!(CodeVerifier::parse(format!("{}+", "a".repeat(43))).is_none());
        assert!(CodeVerifier::parse("a".repeat(128)).is_some());
    }

    #[test]
    fn test_debug_does_not_leak_verifier() {
        let verifier = generate_verifier();
        assert!(!format!("{verifier:?}").contains(verifier.as_str()));
    }

    #[test]
    fn test_store_then_take_consumes_verifier() {
        let mut store: HashMap<String, String> = HashMap::new();
        let verifier = generate_verifier();

        store_verifier(&mut store, KEY, &verifier);
        assert_eq!(retrieve_verifier(&store, KEY), Some(verifier.clone()));
        assert_eq!(take_verifier(&mut store, KEY), Some(verifier));
        assert_eq!(take_verifier(&mut store, KEY), None);
    }

    #[test]
    fn test_new_attempt_overwrites_previous_verifier() {
        let mut store: HashMap<String, String> = HashMap::new();
        let first = generate_verifier();
        let second = generate_verifier();

        store_verifier(&mut store, KEY, &first);
        store_verifier(&mut store, KEY, &second);

        assert_eq!(take_verifier(&mut store, KEY), Some(second));
    }

    #[test]
    fn test_missing_key_is_absent_not_error() {
        let store: HashMap<String, String> = HashMap::new();
        assert!(retrieve_verifier(&store, KEY).is_none());
    }
}
