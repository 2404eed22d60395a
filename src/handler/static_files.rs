//! Static file serving module
//!
//! Resolves request paths against the root directory and serves files,
//! index files and directory listings.

use crate::handler::listing;
use crate::handler::router::RequestContext;
use crate::http::{self, date, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files served in place of a directory listing, in lookup order
pub const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

/// A request path mapped onto the filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedPath {
    pub path: PathBuf,
    /// Request path ended with `/`
    pub trailing_slash: bool,
}

/// Map a URL path onto `root`.
///
/// The path is percent-decoded and normalized lexically; `..` can pop
/// segments but never climbs above `root`.
pub fn translate_path(root: &Path, url_path: &str) -> TranslatedPath {
    // Query strings never reach here (hyper splits them off); fragments might
    let url_path = url_path.split('#').next().unwrap_or_default();
    let trailing_slash = url_path.trim_end().ends_with('/');

    let decoded = percent_decode_str(url_path).decode_utf8_lossy();

    let mut segments: Vec<&str> = Vec::new();
    for word in decoded.split('/') {
        match word {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            w if has_separator(w) => {}
            w => segments.push(w),
        }
    }

    let mut path = root.to_path_buf();
    for segment in segments {
        path.push(segment);
    }

    TranslatedPath {
        path,
        trailing_slash,
    }
}

#[cfg(windows)]
fn has_separator(word: &str) -> bool {
    word.contains('\\') || word.contains(':')
}

#[cfg(not(windows))]
const fn has_separator(_word: &str) -> bool {
    false
}

/// Serve a GET or HEAD request from `root`
pub async fn serve(ctx: &RequestContext<'_>, root: &Path) -> Response<Full<Bytes>> {
    let translated = translate_path(root, ctx.path);
    let mut file_path = translated.path;

    if fs::metadata(&file_path).await.is_ok_and(|m| m.is_dir()) {
        if !ctx.path.ends_with('/') {
            return http::build_redirect_response(&slash_location(ctx.path, ctx.query));
        }

        match find_index_file(&file_path).await {
            Some(index) => file_path = index,
            None => return serve_listing(ctx, &file_path).await,
        }
    } else if translated.trailing_slash {
        return http::build_404_response("File not found", ctx.is_head);
    }

    serve_file(ctx, &file_path).await
}

/// Serve a single regular file with its resolved content type
pub async fn serve_file(ctx: &RequestContext<'_>, file_path: &Path) -> Response<Full<Bytes>> {
    // Missing files and unreadable files look the same to the client
    let Ok(metadata) = fs::metadata(file_path).await else {
        return http::build_404_response("File not found", ctx.is_head);
    };

    let modified = metadata.modified().ok();

    if ctx.if_none_match.is_none() {
        if let (Some(since), Some(modified)) = (
            ctx.if_modified_since.as_deref().and_then(date::parse_http_date),
            modified,
        ) {
            if date::not_modified_since(modified, since) {
                return http::build_304_response();
            }
        }
    }

    let content = match fs::read(file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_warning(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return http::build_404_response("File not found", ctx.is_head);
        }
    };

    let content_type = mime::content_type_for(&file_path.to_string_lossy());
    let last_modified = modified.and_then(date::format_http_date);

    http::build_file_response(content, content_type, last_modified.as_deref(), ctx.is_head)
}

async fn serve_listing(ctx: &RequestContext<'_>, dir: &Path) -> Response<Full<Bytes>> {
    match listing::read_entries(dir).await {
        Ok(entries) => {
            let display_path = percent_decode_str(ctx.path).decode_utf8_lossy();
            let html = listing::render(&display_path, &entries);
            http::build_html_response(html, ctx.is_head)
        }
        Err(e) => {
            logger::log_warning(&format!(
                "Failed to list directory '{}': {}",
                dir.display(),
                e
            ));
            http::build_404_response("No permission to list directory", ctx.is_head)
        }
    }
}

async fn find_index_file(dir: &Path) -> Option<PathBuf> {
    for name in INDEX_FILES {
        let candidate = dir.join(name);
        if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
            return Some(candidate);
        }
    }
    None
}

/// Location for the directory redirect, query string preserved
fn slash_location(path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) => format!("{path}/?{q}"),
        None => format!("{path}/"),
    }
}
