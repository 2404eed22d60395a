// Server module entry point
// Binds the listener and runs the accept loop with an explicit start/stop lifecycle

pub mod connection;
pub mod listener;

// `loop` is a keyword, so the module is exposed as server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::config::Config;

pub use listener::create_listener;
pub use server_loop::start_server_loop;

/// A bound, not yet serving, static dev server
pub struct DevServer {
    listener: TcpListener,
    config: Arc<Config>,
    local_addr: SocketAddr,
}

impl DevServer {
    /// Bind the listening socket described by `config`.
    ///
    /// A relative `server.root` is resolved against the current working
    /// directory now, so later directory changes don't affect serving.
    /// Must be called from within a Tokio runtime.
    pub fn bind(mut config: Config) -> io::Result<Self> {
        let addr = config
            .get_socket_addr()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        if config.server.root.is_relative() {
            config.server.root = std::env::current_dir()?.join(&config.server.root);
        }

        let listener = create_listener(addr)?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            config: Arc::new(config),
            local_addr,
        })
    }

    /// Address actually bound (resolves port 0)
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Serve until the process is terminated
    pub async fn run(self) {
        start_server_loop(self.listener, self.config, Arc::new(Notify::new())).await;
    }

    /// Serve on a background task; the returned handle stops it
    pub fn spawn(self) -> ServerHandle {
        let shutdown = Arc::new(Notify::new());
        let addr = self.local_addr;
        let task = tokio::spawn(start_server_loop(
            self.listener,
            self.config,
            Arc::clone(&shutdown),
        ));

        ServerHandle {
            addr,
            shutdown,
            task,
        }
    }
}

/// Handle to a server started with [`DevServer::spawn`]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting and close the listening socket.
    ///
    /// Connections already accepted are left to finish on their own.
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback_config() -> Config {
        let mut cfg = Config::default();
        cfg.server.host = "127.0.0.1".to_string();
        cfg.server.port = 0;
        cfg
    }

    #[tokio::test]
    async fn test_bind_resolves_relative_root() {
        let server = DevServer::bind(loopback_config()).unwrap();
        assert!(server.config().server.root.is_absolute());
        assert_ne!(server.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_rejects_bad_host() {
        let mut cfg = loopback_config();
        cfg.server.host = "::nope::".to_string();
        let err = DevServer::bind(cfg).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_shutdown_releases_port() {
        let handle = DevServer::bind(loopback_config()).unwrap().spawn();
        let addr = handle.addr();
        handle.shutdown().await;

        // the listener is gone, so the same address can be bound again
        let mut cfg = loopback_config();
        cfg.server.port = addr.port();
        let again = DevServer::bind(cfg).unwrap();
        assert_eq!(again.local_addr(), addr);
    }
}
