//! Request URL helpers for cache-busting.

use url::Url;

/// Append `param=revision` to the query of `url`.
///
/// The existing query string is kept as-is; the pair is added at the end.
pub fn cache_busted(url: &Url, param: &str, revision: &str) -> Url {
    let mut busted = url.clone();
    busted.query_pairs_mut().append_pair(param, revision);
    busted
}

/// Whether two URLs share scheme, host and port.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}
