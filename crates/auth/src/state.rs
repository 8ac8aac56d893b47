//! Shared state for auth handlers and extractors.

use std::sync::Arc;

use axum::extract::FromRef;
use tasklane_core::auth::TokenRepository;
use tasklane_core::storage::UserRepository;

use crate::config::AuthConfig;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenRepository>,
    pub users: Arc<dyn UserRepository>,
    pub config: AuthConfig,
}

impl AuthState {
    pub fn new(
        tokens: Arc<dyn TokenRepository>,
        users: Arc<dyn UserRepository>,
        config: AuthConfig,
    ) -> Self {
        Self {
            tokens,
            users,
            config,
        }
    }
}

/// Allows AuthState to be extracted from a parent state.
impl<S> FromRef<S> for AuthState
where
    S: AsRef<AuthState>,
{
    fn from_ref(state: &S) -> Self {
        state.as_ref().clone()
    }
}
