use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_DATABASE: &str = "notes.db";

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the server listens on
    pub bind: SocketAddr,
    /// Path of the SQLite database file
    pub database: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            database: PathBuf::from(DEFAULT_DATABASE),
        }
    }
}

impl ServerConfig {
    pub fn new(bind: SocketAddr, database: impl Into<PathBuf>) -> Self {
        Self {
            bind,
            database: database.into(),
        }
    }
}
