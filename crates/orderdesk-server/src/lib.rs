//! # orderdesk-server
//!
//! Axum HTTP + `WebSocket` front end.
//!
//! - `POST /api/createOrder` registers an order and returns it with its id
//! - `GET /api/orders/{order_id}` looks an order up
//! - `GET /ws` upgrades to an echo session
//! - `GET /health` reports order and session counts

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod session;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{build_router, start, AppState, ServerHandle};
