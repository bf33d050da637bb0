//! Per-request access to the host's session storage.

use std::collections::HashMap;

/// A keyed slot container owned by the host, typically one user session.
///
/// Strategies read and write a single well-known field through it to carry
/// state from the authorization request to the callback.
pub trait VerifierStore: Send {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String);

    fn remove(&mut self, key: &str) -> Option<String>;

    /// Copy of every stored field.
    fn values(&self) -> HashMap<String, String>;
}

impl VerifierStore for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        HashMap::remove(self, key)
    }

    fn values(&self) -> HashMap<String, String> {
        self.clone()
    }
}

/// Request-scoped context handed to strategy hooks.
#[derive(Default)]
pub struct RequestContext<'a> {
    session: Option<&'a mut dyn VerifierStore>,
}

impl<'a> RequestContext<'a> {
    /// Context without a session; PKCE state cannot be carried.
    pub fn new() -> Self {
        Self { session: None }
    }

    pub fn with_session(session: &'a mut dyn VerifierStore) -> Self {
        Self {
            session: Some(session),
        }
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&(dyn VerifierStore + 'a)> {
        self.session.as_deref()
    }

    pub fn session_mut(&mut self) -> Option<&mut (dyn VerifierStore + 'a)> {
        self.session.as_deref_mut()
    }
}
