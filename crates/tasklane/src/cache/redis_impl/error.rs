//! Redis error mapping to CacheError.

use redis::ErrorKind;
use tasklane_core::cache::CacheError;

/// Maps Redis errors to CacheError.
///
/// A reply that cannot be converted (e.g. a tracking key holding a string)
/// is reported as a serialization problem so the caller treats it as a miss.
pub fn map_redis_error(err: redis::RedisError) -> CacheError {
    if err.is_connection_refusal() || err.is_timeout() || err.is_connection_dropped() {
        CacheError::ConnectionFailed(err.to_string())
    } else if err.kind() == ErrorKind::TypeError {
        CacheError::Serialization(err.to_string())
    } else {
        CacheError::OperationFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redis::RedisError;

    #[test]
    fn test_type_error_maps_to_serialization() {
        let err = RedisError::from((ErrorKind::TypeError, "unexpected reply"));
        assert!(matches!(map_redis_error(err), CacheError::Serialization(_)));
    }

    #[test]
    fn test_other_errors_map_to_operation_failed() {
        let err = RedisError::from((ErrorKind::ResponseError, "WRONGTYPE"));
        assert!(matches!(map_redis_error(err), CacheError::OperationFailed(_)));
    }
}
