use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use orderdesk_server::ServerConfig;
use orderdesk_store::OrderRegistry;
use orderdesk_telemetry::TelemetryConfig;
use tracing::Level;

/// Order registration and WebSocket echo server.
#[derive(Debug, Parser)]
#[command(name = "orderdesk", version)]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "ORDERDESK_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to bind (0 picks a free port).
    #[arg(long, env = "ORDERDESK_PORT", default_value_t = 8000)]
    port: u16,

    /// Maximum concurrent WebSocket sessions.
    #[arg(long, env = "ORDERDESK_MAX_SESSIONS", default_value_t = 1024)]
    max_sessions: usize,

    /// Largest accepted WebSocket message, in bytes.
    #[arg(long, env = "ORDERDESK_MAX_MESSAGE_SIZE", default_value_t = 1024 * 1024)]
    max_message_size: usize,

    /// Close sessions idle for this many seconds (0 disables).
    #[arg(long, env = "ORDERDESK_IDLE_TIMEOUT_SECS", default_value_t = 0)]
    idle_timeout_secs: u64,

    /// Candidate ids drawn per registration before failing.
    #[arg(long, env = "ORDERDESK_ID_MAX_ATTEMPTS", default_value_t = orderdesk_store::DEFAULT_MAX_ATTEMPTS)]
    id_max_attempts: usize,

    /// Default log level. RUST_LOG takes precedence.
    #[arg(long, env = "ORDERDESK_LOG_LEVEL", default_value = "info")]
    log_level: Level,

    /// Emit logs as JSON lines.
    #[arg(long, env = "ORDERDESK_LOG_JSON")]
    log_json: bool,
}

impl Cli {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            max_sessions: self.max_sessions,
            max_message_size: self.max_message_size,
            idle_timeout_secs: self.idle_timeout_secs,
            id_max_attempts: self.id_max_attempts,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _telemetry = orderdesk_telemetry::init_telemetry(TelemetryConfig {
        log_level: cli.log_level,
        json: cli.log_json,
        ..Default::default()
    })?;

    tracing::info!("Starting orderdesk server");

    let config = cli.server_config();
    let registry = Arc::new(OrderRegistry::with_max_attempts(config.id_max_attempts));

    let handle = orderdesk_server::start(config.clone(), registry)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;

    tracing::info!(port = handle.port(), "orderdesk server ready");

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl+c")?;

    tracing::info!("Shutting down");
    handle.shutdown().await;
    Ok(())
}
