use crate::domain::order::OrderStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    OrderCreated,
    PixGenerated,
    PaymentApproved,
    PaymentDeclined,
    PaymentRefunded,
    Chargeback,
    PixExpired,
    OrderCanceled,
    CheckoutAbandoned,
}

impl EventType {
    pub const ALL: [EventType; 9] = [
        EventType::OrderCreated,
        EventType::PixGenerated,
        EventType::PaymentApproved,
        EventType::PaymentDeclined,
        EventType::PaymentRefunded,
        EventType::Chargeback,
        EventType::PixExpired,
        EventType::OrderCanceled,
        EventType::CheckoutAbandoned,
    ];
}

/// Provider-agnostic view of a gateway event. The only thing the lifecycle
/// table consumes from an adapter; provider fields not needed for the
/// transition decision are dropped during normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub event_type: EventType,
    pub status: OrderStatus,
    pub gateway_event_id: String,
    pub occurred_at: chrono::DateTime<chrono::Utc>,
}
