//! File-backed session store.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tcg_auth_core::{LoginAttempt, SessionStore, StoreResult, TokenPair};
use tokio::sync::Mutex;

/// Everything the store persists for one namespace, as a single JSON document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionDocument {
    tokens: Option<TokenPair>,
    attempts: HashMap<String, LoginAttempt>,
}

/// Durable [`SessionStore`] writing one JSON file per storage namespace.
///
/// Distinct flows (member login vs. admin login, say) get distinct namespaces
/// and therefore distinct files, so clearing one session cannot disturb
/// another. Writes go through a temp file and rename so a crash mid-write
/// never leaves a truncated document.
pub struct FileSessionStore {
    path: PathBuf,
    io_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>, namespace: &str) -> Self {
        let path = dir.into().join(format!("{namespace}.json"));
        Self {
            path,
            io_lock: Mutex::new(()),
        }
    }

    async fn read_document(&self) -> StoreResult<SessionDocument> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(SessionDocument::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn write_document(&self, document: &SessionDocument) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save_tokens(&self, pair: &TokenPair) -> StoreResult<()> {
        let _guard = self.io_lock.lock().await;
        let mut document = self.read_document().await?;
        document.tokens = Some(pair.clone());
        self.write_document(&document).await
    }

    async fn load_tokens(&self) -> StoreResult<Option<TokenPair>> {
        let _guard = self.io_lock.lock().await;
        let document = self.read_document().await?;
        Ok(document.tokens)
    }

    async fn save_attempt(&self, attempt: &LoginAttempt) -> StoreResult<()> {
        let _guard = self.io_lock.lock().await;
        let mut document = self.read_document().await?;
        document
            .attempts
            .insert(attempt.state.clone(), attempt.clone());
        self.write_document(&document).await
    }

    async fn take_attempt(&self, state: &str) -> StoreResult<Option<LoginAttempt>> {
        let _guard = self.io_lock.lock().await;
        let mut document = self.read_document().await?;
        let attempt = document.attempts.remove(state);
        if attempt.is_some() {
            self.write_document(&document).await?;
        }
        Ok(attempt)
    }

    async fn clear(&self) -> StoreResult<()> {
        let _guard = self.io_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn cleanup_expired_attempts(&self) -> StoreResult<usize> {
        let _guard = self.io_lock.lock().await;
        let mut document = self.read_document().await?;
        let now = Utc::now();
        let before = document.attempts.len();
        document.attempts.retain(|_, attempt| attempt.expires_at >= now);
        let removed = before - document.attempts.len();
        if removed > 0 {
            self.write_document(&document).await?;
        }
        Ok(removed)
    }
}
