/// Checks if a host ends with a rule's host suffix
///
/// Matching is plain, case-insensitive string suffix matching, so the suffix
/// `example.com` also matches `notexample.com`. Rules that must stop at a
/// label boundary are written with a leading dot (`.example.com`).
///
/// An empty suffix matches nothing.
///
/// # Examples
///
/// ```
/// use baks::url::matches_suffix;
///
/// assert!(matches_suffix("example.com", "blog.example.com"));
/// assert!(matches_suffix(".example.com", "blog.example.com"));
/// assert!(!matches_suffix(".example.com", "example.com"));
/// assert!(!matches_suffix("example.com", "example.org"));
/// ```
pub fn matches_suffix(suffix: &str, host: &str) -> bool {
    if suffix.is_empty() || suffix.len() > host.len() {
        return false;
    }
    host.get(host.len() - suffix.len()..)
        .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}
