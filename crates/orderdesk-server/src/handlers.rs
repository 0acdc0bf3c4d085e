use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use orderdesk_core::{NewOrder, OrderId, OrderRecord};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::server::AppState;

/// `POST /api/createOrder`: register the order and echo it back with its id.
///
/// The body is decoded by hand so any decode failure is a plain 400 carrying
/// the decoder's message, whatever the content type. See [`NewOrder::decode`]
/// for the accepted shapes.
pub async fn create_order(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<OrderRecord>, ApiError> {
    let order = NewOrder::decode(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let order_id = state.registry.register(order)?;
    // Only misses if the registry lost a record it just stored.
    let record = state.registry.lookup(&order_id)?;

    tracing::info!(
        order_id = %record.order_id,
        name = %record.name,
        email = %record.email,
        max = %record.max,
        time = %record.time,
        "order registered"
    );
    Ok(Json(record))
}

/// `GET /api/orders/{order_id}`.
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderRecord>, ApiError> {
    let record = state.registry.lookup(&OrderId::from_raw(order_id))?;
    Ok(Json(record))
}

/// Fallback for any method other than POST on the registration route.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "orders": state.registry.len(),
        "activeSessions": state.sessions.active(),
    }))
}
