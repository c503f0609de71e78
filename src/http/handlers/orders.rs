use crate::domain::event::EventType;
use crate::lifecycle::is_terminal;
use crate::service::order_events::EventOutcome;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

pub async fn get_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.orders_repo.get(order_id).await {
        Ok(Some(order)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "order_id": order.id,
                "status": order.status,
                "terminal": is_terminal(order.status),
            })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "no order with that id"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// Pull-mode status refresh: queries the gateway and runs the answer
/// through the same pipeline as a webhook.
pub async fn check_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.order_events.check_gateway_status(order_id).await {
        Ok(status) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "order_id": order_id,
                "status": status,
                "terminal": is_terminal(status),
            })),
        )
            .into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordOrderEventRequest {
    pub event_type: EventType,
}

/// Internal-only: lifecycle events originating in the checkout flow
/// rather than at the payment provider.
pub async fn record_order_event(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<RecordOrderEventRequest>,
) -> impl IntoResponse {
    match state
        .order_events
        .apply_order_event(order_id, req.event_type)
        .await
    {
        Ok(EventOutcome::UnknownOrder) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "no order with that id"})),
        )
            .into_response(),
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "order_id": order_id,
                "status": outcome.status(),
            })),
        )
            .into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
