use crate::gateways::{GatewayStatus, PaymentGateway};
use crate::repo::credentials_repo::GatewayCredential;
use anyhow::Result;

/// Stand-in gateway for local development (`GATEWAY_MODE=mock`) and tests.
pub struct MockGateway {
    pub behavior: String,
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_status(
        &self,
        _credential: &GatewayCredential,
        gateway_transaction_id: &str,
    ) -> Result<GatewayStatus> {
        let event_tag = match self.behavior.as_str() {
            "ALWAYS_PAID" => "payment.approved",
            "ALWAYS_DECLINED" => "payment.declined",
            "ALWAYS_EXPIRED" => "pix.expired",
            _ => "pix.created",
        };

        Ok(GatewayStatus {
            event_id: format!("mock-{}-{}", gateway_transaction_id, event_tag),
            event_tag: event_tag.to_string(),
            occurred_at: Some(chrono::Utc::now()),
        })
    }
}
