//! Bearer token authentication for tasklane.
//!
//! This crate provides:
//! - Argon2id password hashing
//! - The credential service (register, login, logout, refresh, authenticate)
//! - Token storage (in-memory, SQLite or Redis via feature flags)
//! - The `CurrentUser` extractor and the auth routes

mod config;
mod error;
mod extractors;
mod handlers;
mod password;
pub mod service;
mod state;
mod tokens;

pub use config::{AuthConfig, DEFAULT_TOKEN_TTL_MINUTES, MAX_TOKEN_TTL_MINUTES};
pub use error::{json_data_errors, AuthError};
pub use extractors::{bearer_token, CurrentUser};
pub use handlers::auth_routes;
pub use password::{hash_password, verify_password};
pub use state::AuthState;
pub use tokens::InMemoryTokenStore;
#[cfg(feature = "redis")]
pub use tokens::RedisTokenStore;
#[cfg(feature = "sqlite")]
pub use tokens::SqliteTokenStore;
