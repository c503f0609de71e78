use anyhow::Result;
use checkout_payments::config::AppConfig;
use checkout_payments::domain::order::OrderStatus;
use checkout_payments::gateways::mock::MockGateway;
use checkout_payments::gateways::pushingpay::PushingPayGateway;
use checkout_payments::gateways::PaymentGateway;
use checkout_payments::lifecycle::is_terminal;
use checkout_payments::repo::credentials_repo::CredentialsRepo;
use checkout_payments::repo::orders_repo::OrdersRepo;
use checkout_payments::repo::status_checks_repo::StatusChecksRepo;
use checkout_payments::service::order_events::OrderEventService;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const MAX_ATTEMPTS: i32 = 30;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&cfg.database_url)
        .await?;

    let gateway: Arc<dyn PaymentGateway> = if cfg.gateway_mode == "mock" {
        Arc::new(MockGateway {
            behavior: std::env::var("MOCK_GATEWAY_BEHAVIOR")
                .unwrap_or_else(|_| "ALWAYS_PAID".to_string()),
        })
    } else {
        Arc::new(PushingPayGateway {
            base_url: cfg.pushingpay_base_url.clone(),
            timeout_ms: cfg.gateway_timeout_ms,
            client: reqwest::Client::new(),
        })
    };

    let status_checks_repo = StatusChecksRepo { pool: pool.clone() };
    let service = OrderEventService {
        pool: pool.clone(),
        orders_repo: OrdersRepo { pool: pool.clone() },
        credentials_repo: CredentialsRepo { pool: pool.clone() },
        status_checks_repo: status_checks_repo.clone(),
        gateway,
    };

    loop {
        let due = status_checks_repo.due_items(100).await?;
        for row in due {
            let status = match service.check_gateway_status(row.order_id).await {
                Ok(status) => status,
                Err((_, envelope)) => {
                    tracing::warn!(
                        "status check for order {} failed: {}",
                        row.order_id,
                        envelope.error.message
                    );
                    let next = chrono::Utc::now() + chrono::Duration::minutes(2);
                    status_checks_repo
                        .mark(row.order_id, "PENDING", row.attempts + 1, Some(next))
                        .await?;
                    continue;
                }
            };

            // A paid order only moves again via refund/chargeback webhooks,
            // so the schedule is done with it as well.
            if is_terminal(status) || status == OrderStatus::Paid {
                status_checks_repo
                    .mark(row.order_id, "DONE", row.attempts + 1, None)
                    .await?;
            } else if row.attempts + 1 >= MAX_ATTEMPTS {
                status_checks_repo
                    .mark(row.order_id, "EXHAUSTED", row.attempts + 1, None)
                    .await?;
            } else {
                let next = chrono::Utc::now() + chrono::Duration::minutes(2);
                status_checks_repo
                    .mark(row.order_id, "PENDING", row.attempts + 1, Some(next))
                    .await?;
            }
        }

        tokio::time::sleep(std::time::Duration::from_secs(10)).await;
    }
}
