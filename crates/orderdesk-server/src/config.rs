//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the order server.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind (default `"0.0.0.0"`).
    pub host: String,
    /// Port to bind (default `8000`, `0` auto-assigns).
    pub port: u16,
    /// Maximum concurrent echo sessions.
    pub max_sessions: usize,
    /// Max WebSocket message size in bytes.
    pub max_message_size: usize,
    /// Close a session after this many idle seconds. `0` disables the timeout.
    pub idle_timeout_secs: u64,
    /// Candidate ids drawn per registration before giving up.
    pub id_max_attempts: usize,
}

impl ServerConfig {
    /// `host:port` string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            max_sessions: 1024,
            max_message_size: 1024 * 1024, // 1 MiB
            idle_timeout_secs: 0,
            id_max_attempts: orderdesk_store::DEFAULT_MAX_ATTEMPTS,
        }
    }
}
