// Server loop module
// Accepts connections until told to stop

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::handle_connection;
use crate::config::Config;
use crate::logger;

/// Accept connections on `listener` until `shutdown` is notified.
///
/// Accept errors (e.g. running out of file descriptors) are logged and the
/// loop keeps going. Connections already handed off finish on their own.
pub async fn start_server_loop(listener: TcpListener, config: Arc<Config>, shutdown: Arc<Notify>) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        handle_connection(stream, peer_addr, Arc::clone(&config));
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => break,
        }
    }
}
