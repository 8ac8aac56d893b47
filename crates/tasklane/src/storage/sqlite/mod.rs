//! SQLite storage backend.
//!
//! Uses `rusqlite` for statements and `tokio-rusqlite` to run them off the
//! async executor.

mod conversions;
mod error;
mod query;
mod repository;
mod schema;

pub use repository::SqliteRepository;
