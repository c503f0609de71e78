use crate::domain::event::EventType;
use crate::repo::credentials_repo::GatewayCredential;
use anyhow::Result;

pub mod mock;
pub mod pushingpay;

/// Result of a status-poll query, expressed in the same event vocabulary
/// as inbound webhooks so both paths share one normalize pipeline.
#[derive(Debug, Clone)]
pub struct GatewayStatus {
    pub event_id: String,
    pub event_tag: String,
    pub occurred_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown gateway event type: {0}")]
pub struct UnknownEventType(pub String);

pub fn normalize_tag(tag: &str) -> Result<EventType, UnknownEventType> {
    match tag {
        "pix.created" => Ok(EventType::PixGenerated),
        "payment.approved" => Ok(EventType::PaymentApproved),
        "payment.declined" => Ok(EventType::PaymentDeclined),
        "payment.refunded" => Ok(EventType::PaymentRefunded),
        "payment.chargeback" => Ok(EventType::Chargeback),
        "pix.expired" => Ok(EventType::PixExpired),
        other => Err(UnknownEventType(other.to_string())),
    }
}

#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_status(
        &self,
        credential: &GatewayCredential,
        gateway_transaction_id: &str,
    ) -> Result<GatewayStatus>;
}
