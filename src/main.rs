use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use checkout_payments::config::AppConfig;
use checkout_payments::forwarder::utmify::UtmifyForwarder;
use checkout_payments::gateways::mock::MockGateway;
use checkout_payments::gateways::pushingpay::PushingPayGateway;
use checkout_payments::gateways::PaymentGateway;
use checkout_payments::repo::credentials_repo::CredentialsRepo;
use checkout_payments::repo::forwards_repo::ForwardsRepo;
use checkout_payments::repo::orders_repo::OrdersRepo;
use checkout_payments::repo::status_checks_repo::StatusChecksRepo;
use checkout_payments::service::forward_relay::ForwardRelay;
use checkout_payments::service::order_events::OrderEventService;
use checkout_payments::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let orders_repo = OrdersRepo { pool: pool.clone() };
    let credentials_repo = CredentialsRepo { pool: pool.clone() };
    let forwards_repo = ForwardsRepo { pool: pool.clone() };
    let status_checks_repo = StatusChecksRepo { pool: pool.clone() };

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

    let order_events = OrderEventService {
        pool: pool.clone(),
        orders_repo: orders_repo.clone(),
        credentials_repo: credentials_repo.clone(),
        status_checks_repo: status_checks_repo.clone(),
        gateway,
    };

    let relay = ForwardRelay {
        forwards_repo,
        credentials_repo,
        forwarder: UtmifyForwarder {
            api_url: cfg.utmify_api_url.clone(),
            timeout_ms: cfg.utmify_timeout_ms,
            client: reqwest::Client::new(),
        },
    };
    tokio::spawn(relay.run());

    let state = AppState {
        order_events,
        orders_repo,
        webhook_secret: cfg.pushingpay_webhook_secret.clone(),
    };

    let internal_key = cfg.internal_api_key.clone();
    let internal_routes = Router::new()
        .route(
            "/internal/orders/:order_id/events",
            post(checkout_payments::http::handlers::orders::record_order_event),
        )
        .layer(from_fn_with_state(
            internal_key,
            checkout_payments::http::middleware::internal_auth::require_internal_api_key,
        ));

    let app = Router::new()
        .route("/health", get(checkout_payments::http::handlers::orders::health))
        .route(
            "/webhooks/pushingpay",
            post(checkout_payments::http::handlers::webhooks::pushingpay_webhook),
        )
        .route(
            "/orders/:order_id/status",
            get(checkout_payments::http::handlers::orders::get_order_status),
        )
        .route(
            "/orders/:order_id/status-check",
            post(checkout_payments::http::handlers::orders::check_order_status),
        )
        .merge(internal_routes)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
