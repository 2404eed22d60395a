// Connection handling module
// Serves a single accepted TCP connection

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::handler;
use crate::logger;

/// Handle a single connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures the HTTP/1 connection (keep-alive per config)
/// 3. Limits how long a client may take to send each request head
/// 4. Serves the connection with the request handler
///
/// Response bodies are written without a deadline, so large files on slow
/// links are not cut short. Transport errors are logged and end only this
/// connection.
pub fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    config: Arc<Config>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder
            .keep_alive(config.http.keep_alive)
            .timer(TokioTimer::new())
            .header_read_timeout(Duration::from_secs(config.http.header_read_timeout));

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&config), peer_addr)),
        );

        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }
    });
}
