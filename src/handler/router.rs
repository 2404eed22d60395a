//! Request dispatch module
//!
//! Entry point for HTTP request processing: method dispatch, the base
//! static-file capability, then header augmentation on every response.

use crate::config::Config;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub method: &'a Method,
    /// URI path, still percent-encoded, with leading slashes collapsed to one
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<String>,
    pub if_none_match: Option<String>,
}

impl<'a> RequestContext<'a> {
    pub fn from_parts(parts: &'a Parts) -> Self {
        Self {
            method: &parts.method,
            path: collapse_leading_slashes(parts.uri.path()),
            query: parts.uri.query(),
            is_head: parts.method == Method::HEAD,
            if_modified_since: header_string(parts, "if-modified-since"),
            if_none_match: header_string(parts, "if-none-match"),
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    config: Arc<Config>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    // The body is never read; only the request head matters
    let (parts, _body) = req.into_parts();
    let ctx = RequestContext::from_parts(&parts);

    let response = respond(&ctx, &config.server.root).await;
    let response = finalize(response, &config.http.server_name);

    if config.logging.access_log {
        log_access(&parts, &response, peer_addr, started, &config.logging.access_log_format);
    }

    Ok(response)
}

/// Produce the response for a request before augmentation
pub async fn respond(ctx: &RequestContext<'_>, root: &Path) -> Response<Full<Bytes>> {
    match *ctx.method {
        Method::GET | Method::HEAD => static_files::serve(ctx, root).await,
        Method::OPTIONS => http::build_options_response(),
        _ => http::build_501_response(ctx.method.as_str(), ctx.is_head),
    }
}

/// Stamp the `Server` header and the CORS / no-cache headers onto a response
pub fn finalize(mut response: Response<Full<Bytes>>, server_name: &str) -> Response<Full<Bytes>> {
    let headers = response.headers_mut();
    if !headers.contains_key(SERVER) {
        if let Ok(value) = HeaderValue::from_str(server_name) {
            headers.insert(SERVER, value);
        }
    }
    http::augment(headers);
    response
}

fn log_access(
    req: &Parts,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    format: &str,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = version_label(req.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header_string(req, "referer");
    entry.user_agent = header_string(req, "user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, format);
}

/// `//host/x` would turn into a protocol-relative `Location` on redirect
fn collapse_leading_slashes(path: &str) -> &str {
    let rest = path.trim_start_matches('/');
    if rest.len() + 1 < path.len() {
        &path[path.len() - rest.len() - 1..]
    } else {
        path
    }
}

fn header_string(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::headers::AUGMENTED_HEADERS;
    use http_body_util::BodyExt;
    use std::path::PathBuf;

    struct TestRoot(PathBuf);

    impl TestRoot {
        fn new(tag: &str) -> Self {
            let dir = std::env::temp_dir().join(format!(
                "devserve-router-{tag}-{}",
                std::process::id()
            ));
            std::fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        fn write(&self, name: &str, contents: &str) {
            let path = self.0.join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, contents).unwrap();
        }
    }

    impl Drop for TestRoot {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.0).ok();
        }
    }

    async fn call(method: Method, uri: &str, root: &Path) -> Response<Full<Bytes>> {
        let (parts, ()) = Request::builder()
            .method(method)
            .uri(uri)
            .body(())
            .unwrap()
            .into_parts();
        let ctx = RequestContext::from_parts(&parts);
        finalize(respond(&ctx, root).await, "devserve-test")
    }

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn assert_augmented(resp: &Response<Full<Bytes>>) {
        for (name, value) in AUGMENTED_HEADERS {
            assert_eq!(resp.headers()[name], value, "header {name}");
        }
    }

    #[tokio::test]
    async fn test_options_any_path() {
        let root = TestRoot::new("options");
        let resp = call(Method::OPTIONS, "/anything", &root.0).await;
        assert_eq!(resp.status(), 200);
        assert_augmented(&resp);
        assert!(body_string(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_get_file() {
        let root = TestRoot::new("get");
        root.write("index.html", "<html></html>");
        let resp = call(Method::GET, "/index.html", &root.0).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "text/html");
        assert!(resp.headers().contains_key("last-modified"));
        assert_eq!(resp.headers()["server"], "devserve-test");
        assert_augmented(&resp);
        assert_eq!(body_string(resp).await, "<html></html>");
    }

    #[tokio::test]
    async fn test_js_and_css_types() {
        let root = TestRoot::new("mime");
        root.write("app.js", "<not really js>");
        root.write("site.css", "body{}");
        root.write("data.json", "{}");

        let js = call(Method::GET, "/app.js", &root.0).await;
        assert_eq!(js.headers()["content-type"], "application/javascript");
        let css = call(Method::GET, "/site.css", &root.0).await;
        assert_eq!(css.headers()["content-type"], "text/css");
        let json = call(Method::GET, "/data.json", &root.0).await;
        assert_eq!(json.headers()["content-type"], "application/json");
    }

    #[tokio::test]
    async fn test_missing_file_is_augmented_404() {
        let root = TestRoot::new("missing");
        let resp = call(Method::GET, "/missing.txt", &root.0).await;
        assert_eq!(resp.status(), 404);
        assert_augmented(&resp);
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let root = TestRoot::new("post");
        let resp = call(Method::POST, "/", &root.0).await;
        assert_eq!(resp.status(), 501);
        assert_augmented(&resp);
    }

    #[tokio::test]
    async fn test_directory_redirect_keeps_query() {
        let root = TestRoot::new("redirect");
        root.write("docs/readme.txt", "hi");
        let resp = call(Method::GET, "/docs?v=1", &root.0).await;
        assert_eq!(resp.status(), 301);
        assert_eq!(resp.headers()["location"], "/docs/?v=1");
        assert_augmented(&resp);
    }

    #[tokio::test]
    async fn test_leading_slashes_stay_on_host() {
        let root = TestRoot::new("leading");
        let resp = call(Method::GET, "//evil.example.com/%2e%2e", &root.0).await;
        assert_eq!(resp.status(), 301);
        let location = resp.headers()["location"].to_str().unwrap();
        assert!(!location.starts_with("//"), "location {location}");
        assert_eq!(location, "/evil.example.com/%2e%2e/");
        assert_augmented(&resp);

        let resp = call(Method::GET, "///evil.example.com", &root.0).await;
        assert_eq!(resp.status(), 404);
    }

    #[test]
    fn test_collapse_leading_slashes() {
        assert_eq!(collapse_leading_slashes("/"), "/");
        assert_eq!(collapse_leading_slashes("//"), "/");
        assert_eq!(collapse_leading_slashes("/a//b"), "/a//b");
        assert_eq!(collapse_leading_slashes("///a/b/"), "/a/b/");
        assert_eq!(collapse_leading_slashes(""), "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_directory_is_404() {
        use std::os::unix::fs::PermissionsExt;

        let root = TestRoot::new("locked");
        root.write("locked/secret.txt", "x");
        let locked = root.0.join("locked");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // root ignores permission bits, so there is nothing to check there
        let readable = std::fs::read_dir(&locked).is_ok();
        let resp = call(Method::GET, "/locked/", &root.0).await;
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            return;
        }

        assert_eq!(resp.status(), 404);
        assert_augmented(&resp);
        let body = body_string(resp).await;
        assert!(body.contains("No permission to list directory"));
        assert!(!body.contains("secret.txt"));
    }

    #[tokio::test]
    async fn test_directory_index_file() {
        let root = TestRoot::new("index");
        root.write("site/index.htm", "old-school");
        let resp = call(Method::GET, "/site/", &root.0).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "text/html");
        assert_eq!(body_string(resp).await, "old-school");
    }

    #[tokio::test]
    async fn test_directory_listing() {
        let root = TestRoot::new("listing");
        root.write("assets/app.js", "");
        root.write("assets/img/logo.png", "");
        let resp = call(Method::GET, "/assets/", &root.0).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "text/html; charset=utf-8");
        let body = body_string(resp).await;
        assert!(body.contains("Directory listing for /assets/"));
        assert!(body.contains("href=\"app.js\""));
        assert!(body.contains("href=\"img/\""));
    }

    #[tokio::test]
    async fn test_file_with_trailing_slash_is_404() {
        let root = TestRoot::new("slash");
        root.write("page.html", "x");
        let resp = call(Method::GET, "/page.html/", &root.0).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_head_has_length_no_body() {
        let root = TestRoot::new("head");
        root.write("index.html", "<html></html>");
        let resp = call(Method::HEAD, "/index.html", &root.0).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-length"], "13");
        assert_augmented(&resp);
        assert!(body_string(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_if_modified_since() {
        let root = TestRoot::new("ims");
        root.write("a.txt", "a");

        let req = Request::builder()
            .uri("/a.txt")
            .header("If-Modified-Since", "Fri, 01 Jan 2100 00:00:00 GMT")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        let ctx = RequestContext::from_parts(&req);
        let resp = finalize(respond(&ctx, &root.0).await, "t");
        assert_eq!(resp.status(), 304);
        assert_augmented(&resp);

        // If-None-Match disables the date check
        let req = Request::builder()
            .uri("/a.txt")
            .header("If-Modified-Since", "Fri, 01 Jan 2100 00:00:00 GMT")
            .header("If-None-Match", "\"x\"")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        let ctx = RequestContext::from_parts(&req);
        assert_eq!(respond(&ctx, &root.0).await.status(), 200);

        let req = Request::builder()
            .uri("/a.txt")
            .header("If-Modified-Since", "Thu, 01 Jan 1970 00:00:00 GMT")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        let ctx = RequestContext::from_parts(&req);
        assert_eq!(respond(&ctx, &root.0).await.status(), 200);
    }

    #[test]
    fn test_finalize_keeps_existing_server() {
        let resp = Response::builder()
            .header("Server", "custom")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let resp = finalize(resp, "devserve");
        assert_eq!(resp.headers()["server"], "custom");
        assert_augmented(&resp);
    }
}
