//! In-memory session store.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tcg_auth_core::{LoginAttempt, SessionStore, StoreResult, TokenPair};
use tokio::sync::RwLock;

#[derive(Default)]
struct SessionState {
    tokens: Option<TokenPair>,
    attempts: HashMap<String, LoginAttempt>,
}

/// Non-durable [`SessionStore`] backed by a `RwLock`-guarded map.
#[derive(Default)]
pub struct InMemorySessionStore {
    state: RwLock<SessionState>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save_tokens(&self, pair: &TokenPair) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.tokens = Some(pair.clone());
        Ok(())
    }

    async fn load_tokens(&self) -> StoreResult<Option<TokenPair>> {
        let state = self.state.read().await;
        Ok(state.tokens.clone())
    }

    async fn save_attempt(&self, attempt: &LoginAttempt) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state
            .attempts
            .insert(attempt.state.clone(), attempt.clone());
        Ok(())
    }

    async fn take_attempt(&self, state_param: &str) -> StoreResult<Option<LoginAttempt>> {
        let mut state = self.state.write().await;
        Ok(state.attempts.remove(state_param))
    }

    async fn clear(&self) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.tokens = None;
        state.attempts.clear();
        Ok(())
    }

    async fn cleanup_expired_attempts(&self) -> StoreResult<usize> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let before = state.attempts.len();
        state.attempts.retain(|_, attempt| attempt.expires_at >= now);
        Ok(before - state.attempts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tcg_auth_core::AccessToken;

    fn attempt(state: &str) -> LoginAttempt {
        LoginAttempt::new(
            state.to_string(),
            "verifier123".to_string(),
            "/cart".to_string(),
            600,
        )
    }

    #[tokio::test]
    async fn attempts_are_single_use() {
        let store = InMemorySessionStore::new();
        store.save_attempt(&attempt("abc")).await.unwrap();

        let first = store.take_attempt("abc").await.unwrap();
        assert_eq!(first.unwrap().code_verifier, "verifier123");

        // A replayed callback must find nothing.
        assert!(store.take_attempt("abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_attempts_do_not_collide() {
        let store = InMemorySessionStore::new();
        store.save_attempt(&attempt("tab-one")).await.unwrap();
        store.save_attempt(&attempt("tab-two")).await.unwrap();

        assert!(store.take_attempt("tab-one").await.unwrap().is_some());
        assert!(store.take_attempt("tab-two").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clear_removes_tokens_and_attempts() {
        let store = InMemorySessionStore::new();
        store.save_attempt(&attempt("abc")).await.unwrap();
        store
            .save_tokens(&TokenPair {
                access_token: AccessToken::new("tok".to_string(), 3600),
                refresh_token: None,
            })
            .await
            .unwrap();

        assert!(store.is_logged_in().await.unwrap());

        store.clear().await.unwrap();

        assert!(store.load_tokens().await.unwrap().is_none());
        assert!(store.take_attempt("abc").await.unwrap().is_none());
        assert!(!store.is_logged_in().await.unwrap());
    }

    #[tokio::test]
    async fn expired_access_token_is_not_logged_in() {
        let store = InMemorySessionStore::new();
        store
            .save_tokens(&TokenPair {
                access_token: AccessToken {
                    value: "tok".to_string(),
                    expires_at: Utc::now() - Duration::seconds(1),
                },
                refresh_token: None,
            })
            .await
            .unwrap();

        assert!(!store.is_logged_in().await.unwrap());
    }

    #[tokio::test]
    async fn cleanup_drops_only_expired_attempts() {
        let store = InMemorySessionStore::new();

        let mut stale = attempt("stale");
        stale.expires_at = Utc::now() - Duration::minutes(1);
        store.save_attempt(&stale).await.unwrap();
        store.save_attempt(&attempt("fresh")).await.unwrap();

        assert_eq!(store.cleanup_expired_attempts().await.unwrap(), 1);
        assert!(store.take_attempt("fresh").await.unwrap().is_some());
    }
}
