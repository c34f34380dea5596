use std::time::{SystemTime, UNIX_EPOCH};

/// Strip exactly one leading and one trailing slash from a URL fragment.
/// An input consisting only of slashes collapses to the empty string.
pub fn remove_first_and_last_slash(url: &str) -> String {
    let url = url.strip_prefix('/').unwrap_or(url);
    let url = url.strip_suffix('/').unwrap_or(url);
    url.to_string()
}

/// Normalize a URL fragment to start with exactly one leading slash
pub fn add_first_slash(url: &str) -> String {
    format!("/{}", url.trim_start_matches('/'))
}

/// Current Unix time in seconds
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Generate a unique ID
pub fn generate_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);

    format!("{:x}-{:x}", unix_now(), counter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_first_and_last_slash() {
        assert_eq!(remove_first_and_last_slash("a"), "a");
        assert_eq!(remove_first_and_last_slash("/a"), "a");
        assert_eq!(remove_first_and_last_slash("a/"), "a");
        assert_eq!(remove_first_and_last_slash("/a/"), "a");
        assert_eq!(remove_first_and_last_slash("/api/v1/"), "api/v1");
        assert_eq!(remove_first_and_last_slash("//"), "");
        assert_eq!(remove_first_and_last_slash("/"), "");
        assert_eq!(remove_first_and_last_slash(""), "");
    }

    #[test]
    fn test_add_first_slash() {
        assert_eq!(add_first_slash("x"), "/x");
        assert_eq!(add_first_slash("/x"), "/x");
        assert_eq!(add_first_slash("//x"), "/x");
        assert_eq!(add_first_slash(""), "/");
    }

    #[test]
    fn test_generate_id_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
    }
}
