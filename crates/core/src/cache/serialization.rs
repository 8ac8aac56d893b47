//! JSON encoding of cached values.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::task::{Task, TaskPage};

/// Errors that can occur during cache serialization/deserialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    #[error("Failed to serialize: {0}")]
    SerializeFailed(String),
    #[error("Failed to deserialize: {0}")]
    DeserializeFailed(String),
}

pub type Result<T> = std::result::Result<T, SerializationError>;

fn to_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}

pub fn serialize_task(task: &Task) -> Result<Vec<u8>> {
    to_bytes(task)
}

pub fn deserialize_task(bytes: &[u8]) -> Result<Task> {
    from_bytes(bytes)
}

pub fn serialize_task_page(page: &TaskPage) -> Result<Vec<u8>> {
    to_bytes(page)
}

pub fn deserialize_task_page(bytes: &[u8]) -> Result<TaskPage> {
    from_bytes(bytes)
}
