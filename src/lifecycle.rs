use crate::domain::event::EventType;
use crate::domain::order::OrderStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Accepted(OrderStatus),
    NoOp,
    Rejected,
}

pub fn target_status(event: EventType) -> OrderStatus {
    match event {
        EventType::OrderCreated => OrderStatus::Initiated,
        EventType::PixGenerated => OrderStatus::PixPending,
        EventType::PaymentApproved => OrderStatus::Paid,
        EventType::PaymentDeclined => OrderStatus::Declined,
        EventType::PaymentRefunded => OrderStatus::Refunded,
        EventType::Chargeback => OrderStatus::Chargeback,
        EventType::PixExpired => OrderStatus::Expired,
        EventType::OrderCanceled => OrderStatus::Canceled,
        EventType::CheckoutAbandoned => OrderStatus::Abandoned,
    }
}

pub fn allowed_targets(status: OrderStatus) -> &'static [OrderStatus] {
    match status {
        OrderStatus::Initiated => &[
            OrderStatus::PixPending,
            OrderStatus::Authorized,
            OrderStatus::Paid,
            OrderStatus::Declined,
            OrderStatus::Canceled,
            OrderStatus::Abandoned,
        ],
        OrderStatus::PixPending => &[
            OrderStatus::Paid,
            OrderStatus::Expired,
            OrderStatus::Declined,
            OrderStatus::Canceled,
            OrderStatus::Abandoned,
        ],
        OrderStatus::Authorized => &[
            OrderStatus::Paid,
            OrderStatus::Declined,
            OrderStatus::Canceled,
        ],
        OrderStatus::Paid => &[OrderStatus::Refunded, OrderStatus::Chargeback],
        OrderStatus::Declined
        | OrderStatus::Refunded
        | OrderStatus::Chargeback
        | OrderStatus::Canceled
        | OrderStatus::Expired
        | OrderStatus::Abandoned => &[],
    }
}

pub fn is_terminal(status: OrderStatus) -> bool {
    allowed_targets(status).is_empty()
}

/// Decides what an incoming event does to an order in `current` status.
/// Re-delivery of an already-applied event is a no-op; a transition the
/// table does not allow (late webhook after a manual refund, out-of-order
/// delivery) is rejected and logged, never an error.
pub fn compute_next_status(event: EventType, current: OrderStatus) -> Transition {
    let target = target_status(event);
    if current == target {
        return Transition::NoOp;
    }
    if !allowed_targets(current).contains(&target) {
        tracing::warn!(
            "rejected transition {} -> {} triggered by {:?}",
            current.as_str(),
            target.as_str(),
            event
        );
        return Transition::Rejected;
    }
    Transition::Accepted(target)
}
