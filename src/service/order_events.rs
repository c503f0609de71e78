use crate::domain::event::{EventType, NormalizedEvent};
use crate::domain::order::{ErrorEnvelope, ErrorPayload, Order, OrderStatus};
use crate::forwarder::utmify::{convert, idempotency_key};
use crate::gateways::{normalize_tag, PaymentGateway};
use crate::lifecycle::{compute_next_status, is_terminal, target_status, Transition};
use crate::repo::credentials_repo::CredentialsRepo;
use crate::repo::forwards_repo::ForwardsRepo;
use crate::repo::orders_repo::OrdersRepo;
use crate::repo::status_checks_repo::StatusChecksRepo;
use axum::http::StatusCode;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Applied(OrderStatus),
    NoTransition(OrderStatus),
    Rejected(OrderStatus),
    Duplicate,
    UnknownOrder,
}

impl EventOutcome {
    pub fn status(&self) -> Option<OrderStatus> {
        match self {
            EventOutcome::Applied(s)
            | EventOutcome::NoTransition(s)
            | EventOutcome::Rejected(s) => Some(*s),
            EventOutcome::Duplicate | EventOutcome::UnknownOrder => None,
        }
    }
}

#[derive(Clone)]
pub struct OrderEventService {
    pub pool: PgPool,
    pub orders_repo: OrdersRepo,
    pub credentials_repo: CredentialsRepo,
    pub status_checks_repo: StatusChecksRepo,
    pub gateway: Arc<dyn PaymentGateway>,
}

impl OrderEventService {
    /// Push path: a gateway webhook referencing one of our charges.
    pub async fn apply_gateway_event(
        &self,
        gateway_transaction_id: &str,
        event: NormalizedEvent,
    ) -> Result<EventOutcome, (StatusCode, ErrorEnvelope)> {
        let order = self
            .orders_repo
            .get_by_gateway_transaction(gateway_transaction_id)
            .await
            .map_err(internal)?;

        let Some(order) = order else {
            tracing::warn!(
                "gateway event {} references unknown transaction {}",
                event.gateway_event_id,
                gateway_transaction_id
            );
            return Ok(EventOutcome::UnknownOrder);
        };

        if self
            .orders_repo
            .gateway_event_seen(&event.gateway_event_id)
            .await
            .map_err(internal)?
        {
            tracing::debug!(
                "duplicate delivery of gateway event {}, skipping",
                event.gateway_event_id
            );
            return Ok(EventOutcome::Duplicate);
        }

        self.apply(order, event, true).await
    }

    /// Checkout-originated lifecycle events (created, canceled, abandoned)
    /// that never pass through the payment provider.
    pub async fn apply_order_event(
        &self,
        order_id: Uuid,
        event_type: EventType,
    ) -> Result<EventOutcome, (StatusCode, ErrorEnvelope)> {
        let Some(order) = self.orders_repo.get(order_id).await.map_err(internal)? else {
            return Ok(EventOutcome::UnknownOrder);
        };

        let event = NormalizedEvent {
            event_type,
            status: target_status(event_type),
            gateway_event_id: format!("internal-{}-{:?}", order_id, event_type),
            occurred_at: chrono::Utc::now(),
        };

        // No provider id to dedup on; the lifecycle no-op rule already
        // makes repeats harmless.
        self.apply(order, event, false).await
    }

    /// Pull path: query the gateway for the order's current state and run
    /// the result through the same pipeline as a webhook.
    pub async fn check_gateway_status(
        &self,
        order_id: Uuid,
    ) -> Result<OrderStatus, (StatusCode, ErrorEnvelope)> {
        let Some(order) = self.orders_repo.get(order_id).await.map_err(internal)? else {
            return Err((
                StatusCode::NOT_FOUND,
                err("ORDER_NOT_FOUND", "no order with that id"),
            ));
        };

        if is_terminal(order.status) {
            return Ok(order.status);
        }

        let Some(gateway_transaction_id) = order.gateway_transaction_id.clone() else {
            return Ok(order.status);
        };

        let credential = self
            .credentials_repo
            .get_for_order(order.id)
            .await
            .map_err(internal)?
            .ok_or_else(|| {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    err("MISSING_GATEWAY_CREDENTIAL", "seller has no gateway credential"),
                )
            })?;

        let status = self
            .gateway
            .fetch_status(&credential, &gateway_transaction_id)
            .await
            .map_err(|e| {
                (
                    StatusCode::BAD_GATEWAY,
                    err("GATEWAY_STATUS_QUERY_FAILED", &e.to_string()),
                )
            })?;

        let event_type = match normalize_tag(&status.event_tag) {
            Ok(event_type) => event_type,
            Err(e) => {
                tracing::warn!("{} while polling order {}, dropping", e, order.id);
                return Ok(order.status);
            }
        };

        let event = NormalizedEvent {
            event_type,
            status: target_status(event_type),
            gateway_event_id: status.event_id,
            occurred_at: status.occurred_at.unwrap_or_else(chrono::Utc::now),
        };

        if self
            .orders_repo
            .gateway_event_seen(&event.gateway_event_id)
            .await
            .map_err(internal)?
        {
            return Ok(order.status);
        }

        let current = order.status;
        let outcome = self.apply(order, event, true).await?;
        Ok(outcome.status().unwrap_or(current))
    }

    async fn apply(
        &self,
        mut order: Order,
        event: NormalizedEvent,
        dedup_on_event_id: bool,
    ) -> Result<EventOutcome, (StatusCode, ErrorEnvelope)> {
        // Two passes: a lost compare-and-swap means a concurrent delivery
        // moved the order first, so re-read and re-run the decision once.
        for _ in 0..2 {
            let next = match compute_next_status(event.event_type, order.status) {
                Transition::NoOp => return Ok(EventOutcome::NoTransition(order.status)),
                Transition::Rejected => return Ok(EventOutcome::Rejected(order.status)),
                Transition::Accepted(next) => next,
            };

            let paid_at = (next == OrderStatus::Paid).then_some(event.occurred_at);
            let refunded_at = (next == OrderStatus::Refunded).then_some(event.occurred_at);

            let mut tx = self.pool.begin().await.map_err(|e| internal(e.into()))?;

            if dedup_on_event_id {
                let fresh =
                    OrdersRepo::record_gateway_event_tx(&mut tx, &event.gateway_event_id, order.id)
                        .await
                        .map_err(internal)?;
                if !fresh {
                    tx.rollback().await.map_err(|e| internal(e.into()))?;
                    return Ok(EventOutcome::Duplicate);
                }
            }

            let landed = OrdersRepo::transition_tx(&mut tx, order.id, order.status, next, paid_at, refunded_at)
                .await
                .map_err(internal)?;

            if !landed {
                tx.rollback().await.map_err(|e| internal(e.into()))?;
                order = self
                    .orders_repo
                    .get(order.id)
                    .await
                    .map_err(internal)?
                    .ok_or_else(|| internal(anyhow::anyhow!("order {} vanished mid-transition", order.id)))?;
                continue;
            }

            order.status = next;
            if order.paid_at.is_none() {
                order.paid_at = paid_at;
            }
            if order.refunded_at.is_none() {
                order.refunded_at = refunded_at;
            }

            if let Some(payload) = convert(&order) {
                let key = idempotency_key(&order);
                let payload_json =
                    serde_json::to_value(&payload).map_err(|e| internal(e.into()))?;
                ForwardsRepo::insert_tx(&mut tx, order.id, next, payload_json, &key)
                    .await
                    .map_err(internal)?;
            }

            if next == OrderStatus::PixPending {
                let first_check = chrono::Utc::now() + chrono::Duration::minutes(2);
                StatusChecksRepo::enqueue_tx(&mut tx, order.id, first_check)
                    .await
                    .map_err(internal)?;
            }

            tx.commit().await.map_err(|e| internal(e.into()))?;
            return Ok(EventOutcome::Applied(next));
        }

        // Lost the race twice; the winning deliveries already advanced the
        // order and redelivery will reconcile anything left.
        tracing::warn!(
            "giving up on contended transition for order {} after event {:?}",
            order.id,
            event.event_type
        );
        Ok(EventOutcome::NoTransition(order.status))
    }
}

fn err(code: &str, message: &str) -> ErrorEnvelope {
    ErrorEnvelope {
        error: ErrorPayload {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        },
    }
}

fn internal(e: anyhow::Error) -> (StatusCode, ErrorEnvelope) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        err("INTERNAL_ERROR", &e.to_string()),
    )
}
