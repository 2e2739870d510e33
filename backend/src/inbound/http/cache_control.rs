//! Shared cache-control policy for rendered pages.

/// Pages depend on the caller's session and must be revalidated before reuse.
pub const PRIVATE_NO_CACHE_MUST_REVALIDATE: &str = "private, no-cache, must-revalidate";

/// Build the standard cache-control header tuple for session-dependent responses.
#[must_use]
pub const fn private_no_cache_header() -> (&'static str, &'static str) {
    ("Cache-Control", PRIVATE_NO_CACHE_MUST_REVALIDATE)
}
