use crate::domain::order::{Order, OrderStatus};
use anyhow::Result;
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn downstream_status(status: OrderStatus) -> Option<&'static str> {
    match status {
        OrderStatus::Initiated | OrderStatus::PixPending | OrderStatus::Authorized => {
            Some("waiting_payment")
        }
        OrderStatus::Paid => Some("paid"),
        OrderStatus::Declined | OrderStatus::Canceled => Some("refused"),
        OrderStatus::Refunded => Some("refunded"),
        OrderStatus::Chargeback => Some("chargedback"),
        OrderStatus::Expired => Some("refused"),
        OrderStatus::Abandoned => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtmifyCustomer {
    pub name: String,
    pub email: String,
    pub document: Option<String>,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtmifyOrderPayload {
    pub order_id: String,
    pub status: String,
    pub valor: f64,
    pub payment_method: String,
    pub created_at: String,
    pub approved_date: Option<String>,
    pub refunded_at: Option<String>,
    pub customer: UtmifyCustomer,
    pub tracking_parameters: serde_json::Value,
    pub commission: f64,
    pub is_test: bool,
}

/// Builds the downstream payload for an order, or `None` for statuses the
/// analytics side never sees (abandoned checkouts).
pub fn convert(order: &Order) -> Option<UtmifyOrderPayload> {
    let status = downstream_status(order.status)?;

    Some(UtmifyOrderPayload {
        order_id: order.id.to_string(),
        status: status.to_string(),
        valor: minor_to_major(order.amount_minor_units),
        payment_method: order.payment_method.clone(),
        created_at: format_utc(order.created_at),
        approved_date: order.paid_at.map(format_utc),
        refunded_at: order.refunded_at.map(format_utc),
        customer: UtmifyCustomer {
            name: order.customer_name.clone(),
            email: order.customer_email.clone(),
            document: order.customer_document.clone(),
            country: "BR".to_string(),
        },
        tracking_parameters: order.tracking_params.clone(),
        // Fixed until configurable affiliate rates land; do not infer one.
        commission: 0.0,
        is_test: order.is_test,
    })
}

pub fn idempotency_key(order: &Order) -> String {
    let approved = order
        .paid_at
        .map(|t| t.timestamp().to_string())
        .unwrap_or_else(|| "na".to_string());
    let status = downstream_status(order.status).unwrap_or("none");
    format!("{}-{}-{}", order.id, status, approved)
}

/// Minor units to a two-decimal major-unit figure via integer division,
/// so 4358 becomes exactly 43.58.
pub fn minor_to_major(amount_minor_units: i64) -> f64 {
    let units = amount_minor_units / 100;
    let cents = (amount_minor_units % 100).abs();
    format!("{}.{:02}", units, cents).parse().unwrap_or(0.0)
}

pub fn format_utc(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.format(DATE_FORMAT).to_string()
}

#[derive(Clone)]
pub struct UtmifyForwarder {
    pub api_url: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

impl UtmifyForwarder {
    /// Single delivery attempt. Non-2xx is an error for the caller to
    /// retry; no retry happens here.
    pub async fn send(
        &self,
        payload: &serde_json::Value,
        idempotency_key: &str,
        api_token: &str,
    ) -> Result<()> {
        let resp = self
            .client
            .post(&self.api_url)
            .header("x-api-token", api_token)
            .header("Idempotency-Key", idempotency_key)
            .json(payload)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await?;

        if !resp.status().is_success() {
            anyhow::bail!("utmify delivery returned http {}", resp.status());
        }

        Ok(())
    }
}
