use url::Url;

/// Extracts the host from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// URLs without a host (`mailto:`, `data:`) yield an empty string.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use baks::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM:8443/path").unwrap();
/// assert_eq!(extract_host(&url), "example.com");
/// ```
pub fn extract_host(url: &Url) -> String {
    url.host_str().map(|h| h.to_lowercase()).unwrap_or_default()
}

/// Returns true if a URL path denotes the host root
pub fn is_root_path(path: &str) -> bool {
    path.is_empty() || path == "/"
}

/// Detects a redirect that landed on the host root from a deeper path
///
/// Servers often answer a missing page or a login wall by redirecting to
/// `/`. This is a heuristic: a bookmark that legitimately points at a path
/// which redirects to the root is misclassified.
pub fn redirected_to_host_root(requested_path: &str, final_path: &str) -> bool {
    is_root_path(final_path) && !is_root_path(requested_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_host() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_host(&url), "example.com");
    }

    #[test]
    fn test_extract_subdomain() {
        let url = Url::parse("https://blog.example.com/post").unwrap();
        assert_eq!(extract_host(&url), "blog.example.com");
    }

    #[test]
    fn test_extract_mixed_case_with_port() {
        let url = Url::parse("http://Example.COM:8080/").unwrap();
        assert_eq!(extract_host(&url), "example.com");
    }

    #[test]
    fn test_extract_hostless_url() {
        let url = Url::parse("mailto:someone@example.com").unwrap();
        assert_eq!(extract_host(&url), "");
    }

    #[test]
    fn test_root_paths() {
        assert!(is_root_path(""));
        assert!(is_root_path("/"));
        assert!(!is_root_path("/index.html"));
        assert!(!is_root_path("//"));
    }

    #[test]
    fn test_redirect_from_deep_path_to_root() {
        assert!(redirected_to_host_root("/missing/page", "/"));
        assert!(redirected_to_host_root("/login-required", ""));
    }

    #[test]
    fn test_root_to_root_is_not_an_anomaly() {
        assert!(!redirected_to_host_root("/", "/"));
        assert!(!redirected_to_host_root("", "/"));
    }

    #[test]
    fn test_redirect_between_deep_paths_is_fine() {
        assert!(!redirected_to_host_root("/old", "/new"));
        assert!(!redirected_to_host_root("/", "/welcome"));
    }
}
