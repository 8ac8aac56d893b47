//! Access token storage implementations.
//!
//! Provides `TokenRepository` implementations for:
//! - In-memory (always available)
//! - SQLite (with `sqlite` feature)
//! - Redis (with `redis` feature)

mod inmemory;
#[cfg(feature = "redis")]
mod redis_impl;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use inmemory::InMemoryTokenStore;
#[cfg(feature = "redis")]
pub use redis_impl::RedisTokenStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteTokenStore;
