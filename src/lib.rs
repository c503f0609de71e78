pub mod config;
pub mod domain {
    pub mod event;
    pub mod order;
}
pub mod forwarder {
    pub mod utmify;
}
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod orders;
        pub mod webhooks;
    }
    pub mod middleware {
        pub mod internal_auth;
    }
}
pub mod lifecycle;
pub mod repo {
    pub mod credentials_repo;
    pub mod forwards_repo;
    pub mod orders_repo;
    pub mod status_checks_repo;
}
pub mod service {
    pub mod forward_relay;
    pub mod order_events;
}

#[derive(Clone)]
pub struct AppState {
    pub order_events: service::order_events::OrderEventService,
    pub orders_repo: repo::orders_repo::OrdersRepo,
    pub webhook_secret: Option<String>,
}
