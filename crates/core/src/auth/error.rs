use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("access token not found")]
    TokenNotFound,

    #[error("access token expired")]
    TokenExpired,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl AuthError {
    /// Returns true for failures caused by the presented credentials rather
    /// than by the server.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials | Self::TokenNotFound | Self::TokenExpired
        )
    }
}
