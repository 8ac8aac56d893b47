//! HTTP status codes for repository failures.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// # Examples
///
/// ```
/// use tasklane_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::task_not_found("abc-123");
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::AlreadyExists { .. } => 409,
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::QueryFailed(_) | RepositoryError::Serialization(_) => 500,
        RepositoryError::InvalidData(_) => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_visible_codes() {
        assert_eq!(
            repository_error_to_status_code(&RepositoryError::task_not_found("t")),
            404
        );
        assert_eq!(
            repository_error_to_status_code(&RepositoryError::email_taken("a@b.c")),
            409
        );
    }

    #[test]
    fn test_backend_failures() {
        let unavailable = RepositoryError::ConnectionFailed("pool closed".to_string());
        assert_eq!(repository_error_to_status_code(&unavailable), 503);

        let broken_row = RepositoryError::InvalidData("bad date".to_string());
        assert_eq!(repository_error_to_status_code(&broken_row), 500);

        let query = RepositoryError::QueryFailed("no such table".to_string());
        assert_eq!(repository_error_to_status_code(&query), 500);
    }
}
