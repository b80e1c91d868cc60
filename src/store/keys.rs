//! Key construction and parsing for the `<prefix>/<name>` scheme.

use bytes::Bytes;

/// Builds the storage key for a named resource under a kind prefix.
pub fn resource_key(
    prefix: &str,
    name: &str,
) -> Bytes {
    Bytes::from(format!("{prefix}/{name}"))
}

/// Extracts the resource name from a key directly under `prefix`.
///
/// Returns `None` for keys that are not valid UTF-8, do not sit one path
/// segment below the prefix, or have an empty name.
pub fn resource_name<'a>(
    prefix: &str,
    key: &'a [u8],
) -> Option<&'a str> {
    let key = std::str::from_utf8(key).ok()?;
    let name = key.strip_prefix(prefix)?.strip_prefix('/')?;
    if name.is_empty() || name.contains('/') {
        return None;
    }
    Some(name)
}

/// A controller prefix must be slash-rooted and must not end with a slash.
pub fn is_valid_prefix(prefix: &str) -> bool {
    prefix.len() > 1 && prefix.starts_with('/') && !prefix.ends_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        let key = resource_key("/backup", "foo");
        assert_eq!(key, Bytes::from_static(b"/backup/foo"));
        assert_eq!(resource_name("/backup", &key), Some("foo"));
    }

    #[test]
    fn test_rejects_keys_outside_prefix() {
        assert_eq!(resource_name("/backup", b"/deployment_backup/foo"), None);
        assert_eq!(resource_name("/backup", b"/backupextra/foo"), None);
    }

    #[test]
    fn test_rejects_nested_and_empty_names() {
        assert_eq!(resource_name("/backup", b"/backup/"), None);
        assert_eq!(resource_name("/backup", b"/backup/foo/bar"), None);
        assert_eq!(resource_name("/backup", b"/backup"), None);
    }

    #[test]
    fn test_rejects_non_utf8_keys() {
        assert_eq!(resource_name("/backup", &[0x2f, 0xff, 0xfe]), None);
    }

    #[test]
    fn test_prefix_validation() {
        assert!(is_valid_prefix("/backup"));
        assert!(!is_valid_prefix("backup"));
        assert!(!is_valid_prefix("/backup/"));
        assert!(!is_valid_prefix("/"));
        assert!(!is_valid_prefix(""));
    }
}
