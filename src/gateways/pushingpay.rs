use crate::domain::event::NormalizedEvent;
use crate::gateways::{normalize_tag, GatewayStatus, PaymentGateway, UnknownEventType};
use crate::lifecycle::target_status;
use crate::repo::credentials_repo::GatewayCredential;
use anyhow::Result;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// Inbound webhook body. QR rendering fields are opaque to this service
/// and pass through untouched; `reason` carries decline/refund codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushingPayEvent {
    pub id: String,
    pub event: String,
    pub transaction_id: String,
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub paid_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub qr_code_base64: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

pub fn normalize(event: &PushingPayEvent) -> Result<NormalizedEvent, UnknownEventType> {
    let event_type = normalize_tag(&event.event)?;
    let occurred_at = event
        .paid_at
        .or(event.created_at)
        .unwrap_or_else(chrono::Utc::now);

    Ok(NormalizedEvent {
        event_type,
        status: target_status(event_type),
        gateway_event_id: event.id.clone(),
        occurred_at,
    })
}

/// HMAC-SHA256 over the raw request body, hex-encoded. Comparison goes
/// through `Mac::verify_slice`, which is constant-time.
pub fn verify_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);

    match hex::decode(signature.trim()) {
        Ok(sig) => mac.verify_slice(&sig).is_ok(),
        Err(_) => false,
    }
}

#[derive(Debug, Deserialize)]
struct PushingPayTransaction {
    id: String,
    status: String,
    #[serde(default)]
    created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    paid_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub struct PushingPayGateway {
    pub base_url: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[async_trait::async_trait]
impl PaymentGateway for PushingPayGateway {
    fn name(&self) -> &'static str {
        "pushingpay"
    }

    async fn fetch_status(
        &self,
        credential: &GatewayCredential,
        gateway_transaction_id: &str,
    ) -> Result<GatewayStatus> {
        let url = format!("{}/api/transactions/{}", self.base_url, gateway_transaction_id);
        let resp = self
            .client
            .get(url)
            .bearer_auth(&credential.api_token)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await?;

        if !resp.status().is_success() {
            anyhow::bail!(
                "pushingpay status query for {} returned http {}",
                gateway_transaction_id,
                resp.status()
            );
        }

        let tx: PushingPayTransaction = resp.json().await?;
        Ok(GatewayStatus {
            event_id: format!("poll-{}-{}", tx.id, tx.status),
            event_tag: status_event_tag(&tx.status)
                .map(str::to_string)
                .unwrap_or_else(|| tx.status.clone()),
            occurred_at: tx.paid_at.or(tx.created_at),
        })
    }
}

// The status-query endpoint answers with a bare status word rather than
// the webhook tag vocabulary.
fn status_event_tag(status: &str) -> Option<&'static str> {
    match status {
        "created" => Some("pix.created"),
        "paid" => Some("payment.approved"),
        "declined" => Some("payment.declined"),
        "refunded" => Some("payment.refunded"),
        "chargeback" => Some("payment.chargeback"),
        "expired" => Some("pix.expired"),
        _ => None,
    }
}
