//! Functional core for tasklane.
//!
//! Pure types, validation, query logic and cache-key construction shared by
//! the server and the auth crate. Nothing in here performs I/O; repository
//! and cache behavior is described by traits implemented elsewhere.

#[cfg(feature = "auth")]
pub mod auth;
pub mod cache;
pub mod serde;
pub mod storage;
pub mod task;
pub mod user;
pub mod validation;
