//! Target URL normalization.
//!
//! Guarantees every stored target carries an explicit `http://` or `https://`
//! scheme, so dedup lookups compare like with like. Nothing after the scheme
//! is inspected or rewritten: `example.com/a b` is stored as
//! `https://example.com/a b`.

/// Schemes accepted as already-normalized.
const ACCEPTED_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Scheme prepended to inputs that have none.
const DEFAULT_SCHEME: &str = "https://";

/// Normalizes a raw target URL.
///
/// Returns `raw` unchanged when it already begins with `http://` or
/// `https://`, otherwise returns `https://` followed by `raw`. The function is
/// idempotent.
///
/// Empty input is not rejected here; callers validate presence first.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_url("example.com"), "https://example.com");
/// assert_eq!(normalize_url("http://example.com"), "http://example.com");
/// ```
pub fn normalize_url(raw: &str) -> String {
    if has_scheme(raw) {
        raw.to_string()
    } else {
        format!("{DEFAULT_SCHEME}{raw}")
    }
}

/// Returns true if `raw` begins with one of the accepted schemes.
pub fn has_scheme(raw: &str) -> bool {
    ACCEPTED_SCHEMES.iter().any(|scheme| raw.starts_with(scheme))
}
