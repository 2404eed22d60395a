//! MIME type detection module
//!
//! Returns the Content-Type for a served path. Scripts and stylesheets are
//! pinned to fixed types; everything else goes through the extension table.

use std::path::Path;

/// Content type forced for `.js` files
pub const JAVASCRIPT: &str = "application/javascript";

/// Content type forced for `.css` files
pub const CSS: &str = "text/css";

/// Fallback for unknown or missing extensions
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Get Content-Type for a path, applying the `.js` / `.css` overrides
///
/// # Examples
/// ```
/// use devserve::http::mime::content_type_for;
/// assert_eq!(content_type_for("app.js"), "application/javascript");
/// assert_eq!(content_type_for("site.css"), "text/css");
/// assert_eq!(content_type_for("index.html"), "text/html");
/// assert_eq!(content_type_for("LICENSE"), "application/octet-stream");
/// ```
pub fn content_type_for(path: &str) -> &'static str {
    if path.ends_with(".js") {
        return JAVASCRIPT;
    }
    if path.ends_with(".css") {
        return CSS;
    }
    guess_content_type(Path::new(path))
}

/// Default extension-table lookup, no overrides applied
pub fn guess_content_type(path: &Path) -> &'static str {
    mime_guess::from_path(path).first_raw().unwrap_or(OCTET_STREAM)
}
