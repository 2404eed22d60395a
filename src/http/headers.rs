//! Response header augmentation
//!
//! Every response leaving the server carries the same CORS and cache-busting
//! headers, whatever its status.

use hyper::header::{HeaderName, HeaderValue};
use hyper::HeaderMap;

/// Headers added to every response, in the order they are written
pub const AUGMENTED_HEADERS: [(&str, &str); 6] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET, OPTIONS"),
    ("access-control-allow-headers", "Content-Type"),
    ("cache-control", "no-cache, no-store, must-revalidate"),
    ("pragma", "no-cache"),
    ("expires", "0"),
];

/// Add the CORS and no-cache headers to a response header map.
///
/// Headers already present under other names are left alone.
pub fn augment(headers: &mut HeaderMap) {
    for (name, value) in AUGMENTED_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
}
