//! Cached repository decorators.
//!
//! Decorators wrap a repository with the cache-aside pattern:
//!
//! - **Reads**: check the cache first; on a miss fetch from the repository and
//!   populate the cache
//! - **Writes**: persist to the repository, then invalidate the owner's keys
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let repo = Arc::new(SqliteRepository::new("tasklane.db").await?);
//! let cache = Arc::new(MemoryCache::new(10_000));
//!
//! let cached = CachedTaskRepository::new(repo, cache, Duration::from_secs(3600));
//! ```

mod task;

pub use task::CachedTaskRepository;
