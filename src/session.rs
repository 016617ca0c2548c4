//! User session record and the TTL key-value store that holds it.
//!
//! The in-memory representation is strongly typed; JSON only exists at the
//! store boundary. Expiry silently reverts a user to "no session", never to
//! an error state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::warn;

use crate::plans::Plan;

/// Session lifetime; expiry is the only thing that ends a paid session.
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Whether a trial/subscription window is open for the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Inactive,
}

/// The per-user record interpreted by the dispatcher.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub status: SessionStatus,
    pub plan: Plan,
    /// Remaining free generations; meaningful only when `plan` is Free.
    pub activations_left: u32,
    pub created_at: DateTime<Utc>,
}

impl UserSession {
    /// Fresh free-tier session as created by the `free_demo` action.
    pub fn fresh_free(quota: u32) -> Self {
        Self {
            status: SessionStatus::Active,
            plan: Plan::Free,
            activations_left: quota,
            created_at: Utc::now(),
        }
    }

    /// Active paid-tier session (set after a plan purchase is confirmed).
    pub fn paid(plan: Plan) -> Self {
        Self {
            status: SessionStatus::Active,
            plan,
            activations_left: 0,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Free tier with nothing left: a business-rule condition, not an error.
    pub fn quota_exhausted(&self) -> bool {
        self.plan == Plan::Free && self.activations_left == 0
    }

    /// Consume one free generation. Paid plans are never touched and the
    /// counter never goes below zero.
    pub fn consume_activation(&mut self) {
        if self.plan == Plan::Free {
            self.activations_left = self.activations_left.saturating_sub(1);
        }
    }
}

/// Contract the dialogue logic needs from the session store: get and set
/// with a TTL, keyed by string. Values are opaque JSON strings here.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError>;
}

fn session_key(user_id: u64) -> String {
    format!("session:{user_id}")
}

/// Load and decode a user session. An unreadable record is discarded (with a
/// warning) rather than surfaced, same as an expired one.
pub async fn load_session(
    store: &dyn SessionStore,
    user_id: u64,
) -> Result<Option<UserSession>, StoreError> {
    match store.fetch(&session_key(user_id)).await? {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(user_id, error = %e, "Discarding unreadable session record");
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

/// Persist a user session with the standard TTL.
pub async fn save_session(
    store: &dyn SessionStore,
    user_id: u64,
    session: &UserSession,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(session)?;
    store.put(&session_key(user_id), raw, SESSION_TTL).await
}

/// Redis-backed store used in production.
pub struct RedisSessionStore {
    client: redis::Client,
}

impl RedisSessionStore {
    pub fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn fetch(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(key, value, ttl.as_secs()).await?;
        Ok(())
    }
}

/// In-memory store with the same expiry semantics, for tests.
#[derive(Default)]
pub struct InMemorySessionStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn fetch(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.entries.lock().expect("store lock poisoned");
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("store lock poisoned");
        entries.insert(key.to_string(), (value, Instant::now() + ttl));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_free_session() {
        let session = UserSession::fresh_free(5);
        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(session.plan, Plan::Free);
        assert_eq!(session.activations_left, 5);
        assert!(!session.quota_exhausted());
    }

    #[test]
    fn test_consume_activation_floors_at_zero() {
        let mut session = UserSession::fresh_free(1);
        session.consume_activation();
        assert_eq!(session.activations_left, 0);
        assert!(session.quota_exhausted());
        session.consume_activation();
        assert_eq!(session.activations_left, 0);
    }

    #[test]
    fn test_paid_plans_never_consume() {
        let mut session = UserSession::paid(Plan::Pro);
        session.consume_activation();
        assert_eq!(session.activations_left, 0);
        assert!(!session.quota_exhausted());
    }

    #[test]
    fn test_session_record_field_names() {
        let session = UserSession::fresh_free(5);
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&session).unwrap()).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["plan"], "free");
        assert_eq!(json["activations_left"], 5);
        assert!(json["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let store = InMemorySessionStore::new();
        let session = UserSession::fresh_free(5);
        save_session(&store, 42, &session).await.unwrap();
        assert_eq!(load_session(&store, 42).await.unwrap(), Some(session));
        assert_eq!(load_session(&store, 43).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_absent() {
        let store = InMemorySessionStore::new();
        store
            .put("session:1", "{}".to_string(), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(store.fetch("session:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_record_reads_as_absent() {
        let store = InMemorySessionStore::new();
        store
            .put("session:7", "not json".to_string(), SESSION_TTL)
            .await
            .unwrap();
        assert_eq!(load_session(&store, 7).await.unwrap(), None);
    }
}
