//! HTTP protocol layer module
//!
//! Header augmentation, content-type resolution, HTTP dates and response
//! builders, independent of how paths are resolved on disk.

pub mod date;
pub mod headers;
pub mod mime;
pub mod response;

// Re-export commonly used items
pub use headers::augment;
pub use mime::content_type_for;
pub use response::{
    build_304_response, build_404_response, build_501_response, build_file_response,
    build_html_response, build_options_response, build_redirect_response,
};
