mod error;
mod keys;
mod patterns;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    extract_user_id_from_key, extract_user_id_from_pattern, is_tracked_key, task_key,
    task_list_key, task_list_pattern, tracking_key,
};
pub use patterns::pattern_matches;
pub use serialization::{
    deserialize_task, deserialize_task_page, serialize_task, serialize_task_page,
    SerializationError,
};
pub use traits::Cache;
