//! Cache headers for dashboard responses.

/// Private responses must always be revalidated before reuse.
pub const PRIVATE_NO_CACHE_MUST_REVALIDATE: &str = "private, no-cache, must-revalidate";

/// Response header listing the views a mutation made stale, comma-separated.
pub const REVALIDATE_HEADER: &str = "X-Revalidate";

/// Build the standard cache-control header tuple for private responses.
pub const fn private_no_cache_header() -> (&'static str, &'static str) {
    ("Cache-Control", PRIVATE_NO_CACHE_MUST_REVALIDATE)
}
