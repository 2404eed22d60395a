//! Development static file server.
//!
//! Serves a directory over HTTP/1.x with permissive CORS headers, caching
//! disabled on every response, and fixed content types for `.js` and `.css`.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::Config;
pub use server::{DevServer, ServerHandle};
