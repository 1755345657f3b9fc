//! URL resolution for manifest entries.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a relative or absolute URL string against `base`.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Join against the base (absolute input ignores the base)
/// 3. Require an http(s) scheme
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn resolve_url(input: &str, base: &Url) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://app.example.com/sw/").unwrap()
    }

    #[test]
    fn test_resolve_root_relative() {
        let url = resolve_url("/static/app.js", &base()).unwrap();
        assert_eq!(url.as_str(), "https://app.example.com/static/app.js");
    }

    #[test]
    fn test_resolve_path_relative() {
        let url = resolve_url("hello.txt", &base()).unwrap();
        assert_eq!(url.as_str(), "https://app.example.com/sw/hello.txt");
    }

    #[test]
    fn test_resolve_absolute_ignores_base() {
        let url = resolve_url("https://CDN.example.org/lib.js", &base()).unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.org/lib.js");
    }

    #[test]
    fn test_resolve_removes_fragment_keeps_query() {
        let url = resolve_url("/index.html?v=2#top", &base()).unwrap();
        assert_eq!(url.query(), Some("v=2"));
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve_url("file:///etc/passwd", &base());
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_whitespace_only() {
        assert!(matches!(resolve_url("   ", &base()), Err(UrlError::Empty)));
    }
}
