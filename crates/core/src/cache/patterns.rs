//! Glob matching for cache keys.
//!
//! Only `*` is special; it matches any run of characters, including none.
//! Keys are ASCII so matching works on bytes.

/// Checks if a cache key matches a glob pattern.
///
/// # Examples
///
/// ```
/// use tasklane_core::cache::pattern_matches;
///
/// assert!(pattern_matches("tasks:1:list:*", "tasks:1:list:page=3"));
/// assert!(pattern_matches("tasks:*:item:*", "tasks:1:item:2"));
/// assert!(!pattern_matches("tasks:1:list:*", "tasks:1:item:2"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    let pattern = pattern.as_bytes();
    let key = key.as_bytes();

    let (mut p, mut k) = (0, 0);
    // Position of the last `*` seen and the key position it was tried at.
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        match pattern.get(p) {
            Some(b'*') => {
                backtrack = Some((p, k));
                p += 1;
            }
            Some(&c) if c == key[k] => {
                p += 1;
                k += 1;
            }
            _ => match backtrack {
                Some((star, tried)) => {
                    p = star + 1;
                    k = tried + 1;
                    backtrack = Some((star, tried + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == b'*')
}
