use crate::gateways::pushingpay::{normalize, verify_signature, PushingPayEvent};
use crate::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

/// Gateway callback entry point. Anything short of a persistence failure
/// is acknowledged with 200 so the provider does not retry-storm us;
/// recoverable anomalies are logged instead.
pub async fn pushingpay_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if let Some(secret) = &state.webhook_secret {
        let signature = headers
            .get("X-Signature")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("");

        if !verify_signature(&body, signature, secret) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": "invalid webhook signature"})),
            )
                .into_response();
        }
    }

    let event: PushingPayEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": format!("malformed webhook body: {e}")})),
            )
                .into_response();
        }
    };

    let normalized = match normalize(&event) {
        Ok(normalized) => normalized,
        Err(e) => {
            tracing::warn!("{}, dropping event {}", e, event.id);
            return (StatusCode::OK, Json(serde_json::json!({"ok": true}))).into_response();
        }
    };

    match state
        .order_events
        .apply_gateway_event(&event.transaction_id, normalized)
        .await
    {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({"ok": true}))).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}
