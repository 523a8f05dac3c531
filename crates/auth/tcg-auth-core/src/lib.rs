//! Core token types and session storage traits for member authentication.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Short-lived credential used to call member-protected APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub value: String,
    /// Absolute expiry, serialized as seconds since epoch.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: String, expires_in_seconds: u64) -> Self {
        Self {
            value,
            expires_at: Utc::now() + Duration::seconds(expires_in_seconds as i64),
        }
    }

    /// A token expiring exactly now is already unusable.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Long-lived credential used to mint new access tokens without re-login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    pub value: String,
}

/// Access/refresh token pair minted by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: AccessToken,
    pub refresh_token: Option<RefreshToken>,
}

/// One in-flight login attempt, keyed by its `state` value.
///
/// Keying attempts by state means two tabs starting logins concurrently write
/// two records instead of racing on a shared slot, and each callback finds
/// the verifier that belongs to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub state: String,
    pub code_verifier: String,
    /// Where the member was before login began; the post-login redirect target.
    pub original_uri: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl LoginAttempt {
    pub fn new(
        state: String,
        code_verifier: String,
        original_uri: String,
        ttl_seconds: u64,
    ) -> Self {
        let created_at = Utc::now();
        let expires_at = created_at + Duration::seconds(ttl_seconds as i64);

        Self {
            state,
            code_verifier,
            original_uri,
            created_at,
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Durable client-side session state: the persisted token pair plus any
/// in-flight login attempts.
///
/// Implementations are injected as `Arc<dyn SessionStore>` so tests can
/// substitute an in-memory store without touching globals.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save_tokens(&self, pair: &TokenPair) -> StoreResult<()>;

    async fn load_tokens(&self) -> StoreResult<Option<TokenPair>>;

    /// Store a new login attempt under its state value.
    async fn save_attempt(&self, attempt: &LoginAttempt) -> StoreResult<()>;

    /// Remove and return the attempt for `state`. Attempts are single-use:
    /// a second take for the same state returns `None`.
    async fn take_attempt(&self, state: &str) -> StoreResult<Option<LoginAttempt>>;

    /// Remove the token pair and every pending attempt. Leaving any key
    /// behind corrupts the next login attempt.
    async fn clear(&self) -> StoreResult<()>;

    /// Drop attempts past their TTL, returning how many were removed.
    async fn cleanup_expired_attempts(&self) -> StoreResult<usize>;

    /// Computed on every call, never cached: a session is live only while
    /// the stored access token is unexpired.
    async fn is_logged_in(&self) -> StoreResult<bool> {
        Ok(match self.load_tokens().await? {
            Some(pair) => !pair.access_token.is_expired(),
            None => false,
        })
    }
}
