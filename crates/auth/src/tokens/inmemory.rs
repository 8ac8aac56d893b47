//! In-memory token storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use tasklane_core::auth::{AccessToken, Result, TokenRepository, TokenValue};

/// Token store backed by a `HashMap`. Tokens are lost on restart.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenStore {
    tokens: Arc<RwLock<HashMap<String, AccessToken>>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenStore {
    async fn create_token(&self, token: &AccessToken) -> Result<()> {
        let mut tokens = self.tokens.write().await;
        tokens.insert(token.token.as_str().to_string(), token.clone());
        Ok(())
    }

    async fn get_token(&self, value: &TokenValue) -> Result<Option<AccessToken>> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(value.as_str()).cloned())
    }

    async fn delete_user_tokens(&self, user_id: Uuid) -> Result<()> {
        let mut tokens = self.tokens.write().await;
        tokens.retain(|_, t| t.user_id != user_id);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.expires_at > now);
        Ok(before - tokens.len())
    }
}
