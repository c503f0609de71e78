use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Initiated,
    PixPending,
    Authorized,
    Paid,
    Declined,
    Refunded,
    Chargeback,
    Canceled,
    Expired,
    Abandoned,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 10] = [
        OrderStatus::Initiated,
        OrderStatus::PixPending,
        OrderStatus::Authorized,
        OrderStatus::Paid,
        OrderStatus::Declined,
        OrderStatus::Refunded,
        OrderStatus::Chargeback,
        OrderStatus::Canceled,
        OrderStatus::Expired,
        OrderStatus::Abandoned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Initiated => "initiated",
            OrderStatus::PixPending => "pix_pending",
            OrderStatus::Authorized => "authorized",
            OrderStatus::Paid => "paid",
            OrderStatus::Declined => "declined",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Chargeback => "chargeback",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Expired => "expired",
            OrderStatus::Abandoned => "abandoned",
        }
    }

    pub fn parse(s: &str) -> Option<OrderStatus> {
        match s {
            "initiated" => Some(OrderStatus::Initiated),
            "pix_pending" => Some(OrderStatus::PixPending),
            "authorized" => Some(OrderStatus::Authorized),
            "paid" => Some(OrderStatus::Paid),
            "declined" => Some(OrderStatus::Declined),
            "refunded" => Some(OrderStatus::Refunded),
            "chargeback" => Some(OrderStatus::Chargeback),
            "canceled" => Some(OrderStatus::Canceled),
            "expired" => Some(OrderStatus::Expired),
            "abandoned" => Some(OrderStatus::Abandoned),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub status: OrderStatus,
    pub amount_minor_units: i64,
    pub payment_method: String,
    pub gateway_transaction_id: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_document: Option<String>,
    pub tracking_params: serde_json::Value,
    pub is_test: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub paid_at: Option<chrono::DateTime<chrono::Utc>>,
    pub refunded_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}
