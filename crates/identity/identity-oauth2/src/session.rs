//! Server-side login sessions carrying per-attempt state between requests.

use crate::error::{OAuth2Error, OAuth2Result};
use crate::store::VerifierStore;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Session data identified by an opaque id, usually carried in a cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub values: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Fresh session with a new id, expiring `ttl_seconds` from now.
    pub fn new(ttl_seconds: u64) -> OAuth2Result<Self> {
        let created_at = Utc::now();
        let expires_at = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| created_at.checked_add_signed(ttl))
            .ok_or_else(|| {
                OAuth2Error::SessionError(format!(
                    "session TTL of {}s is out of range",
                    ttl_seconds
                ))
            })?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            values: HashMap::new(),
            created_at,
            expires_at,
        })
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

impl VerifierStore for Session {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    fn values(&self) -> HashMap<String, String> {
        self.values.clone()
    }
}

/// Trait for session storage
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a live session; expired sessions are treated as missing
    async fn load(&self, id: &str) -> OAuth2Result<Option<Session>>;

    /// Insert or replace a session
    async fn save(&self, session: Session) -> OAuth2Result<()>;

    async fn destroy(&self, id: &str) -> OAuth2Result<()>;

    /// Drop expired sessions, returning how many were removed
    async fn cleanup_expired(&self) -> OAuth2Result<usize>;
}

/// In-memory implementation of SessionStore
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: &str) -> OAuth2Result<Option<Session>> {
        let mut sessions = self.sessions.write().await;

        let Some(session) = sessions.get(id).cloned() else {
            return Ok(None);
        };

        if session.is_expired() {
            sessions.remove(id);
            return Ok(None);
        }

        Ok(Some(session))
    }

    async fn save(&self, session: Session) -> OAuth2Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn destroy(&self, id: &str) -> OAuth2Result<()> {
        self.sessions.write().await.remove(id);
        Ok(())
    }

    async fn cleanup_expired(&self) -> OAuth2Result<usize> {
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();

        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at >= now);

        Ok(before - sessions.len())
    }
}
