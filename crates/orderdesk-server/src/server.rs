use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use orderdesk_store::OrderRegistry;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::handlers;
use crate::session::{self, SessionSettings, SessionSlots};

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<OrderRegistry>,
    pub sessions: SessionSlots,
    pub session_settings: SessionSettings,
}

impl AppState {
    pub fn new(config: &ServerConfig, registry: Arc<OrderRegistry>) -> Self {
        Self {
            registry,
            sessions: SessionSlots::new(config.max_sessions),
            session_settings: SessionSettings {
                max_message_size: config.max_message_size,
                idle_timeout: config.idle_timeout(),
            },
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/createOrder",
            post(handlers::create_order).fallback(handlers::method_not_allowed),
        )
        .route("/api/orders/{order_id}", get(handlers::get_order))
        .route("/ws", get(ws_handler))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind the listener and serve in a background task.
pub async fn start(
    config: ServerConfig,
    registry: Arc<OrderRegistry>,
) -> Result<ServerHandle, std::io::Error> {
    let router = build_router(AppState::new(&config, registry));
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(addr = %local_addr, "HTTP server started");

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        let shutdown = async {
            let _ = shutdown_rx.await;
        };
        if let Err(e) = axum::serve(listener, router).with_graceful_shutdown(shutdown).await {
            tracing::error!(error = %e, "HTTP server stopped with error");
        }
    });

    Ok(ServerHandle {
        addr: local_addr,
        shutdown: Some(shutdown_tx),
        server,
    })
}

/// Handle returned by `start()`.
pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    server: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    ///
    /// Open WebSocket sessions keep their own tasks and end when their peers
    /// disconnect.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.server).await {
            tracing::warn!(error = %e, "server task did not finish cleanly");
        }
    }
}

/// WebSocket upgrade handler. Claims a session slot before the handshake.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Result<Response, ApiError> {
    let slot = state.sessions.try_claim().ok_or_else(|| {
        tracing::warn!(capacity = state.sessions.capacity(), "session limit reached, refusing upgrade");
        ApiError::TooManySessions
    })?;
    let settings = state.session_settings;

    Ok(ws
        .max_message_size(settings.max_message_size)
        .on_failed_upgrade(|e: axum::Error| tracing::warn!(error = %e, "websocket handshake failed"))
        .on_upgrade(move |socket| session::run_session(socket, settings, slot)))
}
