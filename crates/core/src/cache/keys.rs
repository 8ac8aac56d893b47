use uuid::Uuid;

const PREFIX: &str = "tasks:";

/// Returns the cache key for a single task.
pub fn task_key(user_id: Uuid, task_id: Uuid) -> String {
    format!("tasks:{}:item:{}", user_id, task_id)
}

/// Returns the cache key for one page of a user's unfiltered task list.
///
/// `fingerprint` comes from `TaskQuery::fingerprint`, e.g. `page=2`.
pub fn task_list_key(user_id: Uuid, fingerprint: &str) -> String {
    format!("tasks:{}:list:{}", user_id, fingerprint)
}

/// Returns the pattern matching every cached list page of a user.
pub fn task_list_pattern(user_id: Uuid) -> String {
    format!("tasks:{}:list:*", user_id)
}

/// Returns the key of the set tracking every cache key stored for a user.
///
/// Pattern deletes resolve against this set instead of a keyspace scan.
pub fn tracking_key(user_id: Uuid) -> String {
    format!("tasks:{}:_keys", user_id)
}

/// Extracts the owning user ID from a cache key, if present.
///
/// # Examples
///
/// ```
/// use tasklane_core::cache::extract_user_id_from_key;
/// use uuid::Uuid;
///
/// let id = Uuid::nil();
/// let key = format!("tasks:{}:list:page=1", id);
/// assert_eq!(extract_user_id_from_key(&key), Some(id));
///
/// assert_eq!(extract_user_id_from_key("session:123"), None);
/// ```
pub fn extract_user_id_from_key(key: &str) -> Option<Uuid> {
    let rest = key.strip_prefix(PREFIX)?;
    let uuid_part = rest.split(':').next()?;
    Uuid::parse_str(uuid_part).ok()
}

/// Extracts the owning user ID from a pattern.
///
/// Returns `None` when the user position is itself a wildcard.
pub fn extract_user_id_from_pattern(pattern: &str) -> Option<Uuid> {
    let rest = pattern.strip_prefix(PREFIX)?;
    let uuid_part = rest.split(':').next()?;
    if uuid_part.contains('*') {
        return None;
    }
    Uuid::parse_str(uuid_part).ok()
}

/// Returns true for keys that belong in a user's tracking set
/// (`tasks:{uuid}:list:...` and `tasks:{uuid}:item:...`).
pub fn is_tracked_key(key: &str) -> bool {
    let Some(rest) = key.strip_prefix(PREFIX) else {
        return false;
    };
    let mut parts = rest.splitn(3, ':');
    let (Some(id), Some(kind), Some(_)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    Uuid::parse_str(id).is_ok() && matches!(kind, "list" | "item")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_uuid() -> Uuid {
        Uuid::nil()
    }

    fn task_uuid() -> Uuid {
        Uuid::from_u128(1)
    }

    #[test]
    fn test_task_key() {
        let key = task_key(test_uuid(), task_uuid());
        assert_eq!(
            key,
            "tasks:00000000-0000-0000-0000-000000000000:item:00000000-0000-0000-0000-000000000001"
        );
    }

    #[test]
    fn test_task_list_key() {
        let key = task_list_key(test_uuid(), "page=2");
        assert_eq!(key, "tasks:00000000-0000-0000-0000-000000000000:list:page=2");
    }

    #[test]
    fn test_task_list_pattern() {
        let pattern = task_list_pattern(test_uuid());
        assert_eq!(pattern, "tasks:00000000-0000-0000-0000-000000000000:list:*");
    }

    #[test]
    fn test_tracking_key() {
        let key = tracking_key(test_uuid());
        assert_eq!(key, "tasks:00000000-0000-0000-0000-000000000000:_keys");
    }

    #[test]
    fn test_extract_user_id_from_key() {
        let id = test_uuid();
        assert_eq!(extract_user_id_from_key(&task_list_key(id, "page=1")), Some(id));
        assert_eq!(extract_user_id_from_key(&task_key(id, task_uuid())), Some(id));
        assert_eq!(extract_user_id_from_key("tasks:not-a-uuid:list"), None);
        assert_eq!(extract_user_id_from_key("user:123"), None);
    }

    #[test]
    fn test_extract_user_id_from_pattern() {
        let id = test_uuid();
        assert_eq!(extract_user_id_from_pattern(&task_list_pattern(id)), Some(id));
        assert_eq!(extract_user_id_from_pattern("tasks:*:list:*"), None);
        assert_eq!(extract_user_id_from_pattern("user:*"), None);
    }

    #[test]
    fn test_is_tracked_key() {
        let id = test_uuid();
        assert!(is_tracked_key(&task_list_key(id, "page=1")));
        assert!(is_tracked_key(&task_key(id, task_uuid())));

        assert!(!is_tracked_key(&tracking_key(id)));
        assert!(!is_tracked_key("tasks:not-a-uuid:list:page=1"));
        assert!(!is_tracked_key("user:123"));
    }
}
