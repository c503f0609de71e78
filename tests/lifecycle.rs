use checkout_payments::domain::event::EventType;
use checkout_payments::domain::order::OrderStatus;
use checkout_payments::lifecycle::{
    allowed_targets, compute_next_status, is_terminal, target_status, Transition,
};

#[test]
fn pix_generated_moves_initiated_order_to_pending() {
    let out = compute_next_status(EventType::PixGenerated, OrderStatus::Initiated);
    assert_eq!(out, Transition::Accepted(OrderStatus::PixPending));
}

#[test]
fn redelivered_event_is_a_noop() {
    let first = compute_next_status(EventType::PixGenerated, OrderStatus::Initiated);
    let Transition::Accepted(next) = first else {
        panic!("expected accepted transition, got {:?}", first);
    };

    let second = compute_next_status(EventType::PixGenerated, next);
    assert_eq!(second, Transition::NoOp);
}

#[test]
fn approval_from_pending_reaches_paid() {
    let out = compute_next_status(EventType::PaymentApproved, OrderStatus::PixPending);
    assert_eq!(out, Transition::Accepted(OrderStatus::Paid));
}

#[test]
fn late_expiry_after_payment_is_rejected() {
    let out = compute_next_status(EventType::PixExpired, OrderStatus::Paid);
    assert_eq!(out, Transition::Rejected);
}

#[test]
fn paid_allows_only_refund_and_chargeback() {
    assert_eq!(
        allowed_targets(OrderStatus::Paid),
        &[OrderStatus::Refunded, OrderStatus::Chargeback]
    );
    assert_eq!(
        compute_next_status(EventType::PaymentRefunded, OrderStatus::Paid),
        Transition::Accepted(OrderStatus::Refunded)
    );
    assert_eq!(
        compute_next_status(EventType::Chargeback, OrderStatus::Paid),
        Transition::Accepted(OrderStatus::Chargeback)
    );
}

#[test]
fn terminal_states_accept_nothing() {
    let terminal: Vec<OrderStatus> = OrderStatus::ALL
        .into_iter()
        .filter(|s| is_terminal(*s))
        .collect();

    assert_eq!(
        terminal,
        vec![
            OrderStatus::Declined,
            OrderStatus::Refunded,
            OrderStatus::Chargeback,
            OrderStatus::Canceled,
            OrderStatus::Expired,
            OrderStatus::Abandoned,
        ]
    );

    for status in terminal {
        for event in EventType::ALL {
            let out = compute_next_status(event, status);
            assert!(
                matches!(out, Transition::NoOp | Transition::Rejected),
                "terminal {:?} accepted {:?}",
                status,
                event
            );
        }
    }
}

#[test]
fn decision_is_total_over_every_pair() {
    for status in OrderStatus::ALL {
        for event in EventType::ALL {
            match compute_next_status(event, status) {
                Transition::Accepted(next) => {
                    assert!(allowed_targets(status).contains(&next));
                    assert_eq!(next, target_status(event));
                }
                Transition::NoOp => assert_eq!(status, target_status(event)),
                Transition::Rejected => {
                    assert!(!allowed_targets(status).contains(&target_status(event)));
                }
            }
        }
    }
}

#[test]
fn no_event_leads_back_out_of_a_terminal_status() {
    // Monotonicity: once terminal, no event sequence can reach an open
    // status again, because no event is ever accepted from there.
    for status in OrderStatus::ALL.into_iter().filter(|s| is_terminal(*s)) {
        for event in EventType::ALL {
            assert!(!matches!(
                compute_next_status(event, status),
                Transition::Accepted(_)
            ));
        }
    }
}

#[test]
fn event_targets_match_the_fixed_table() {
    assert_eq!(target_status(EventType::OrderCreated), OrderStatus::Initiated);
    assert_eq!(target_status(EventType::PixGenerated), OrderStatus::PixPending);
    assert_eq!(target_status(EventType::PaymentApproved), OrderStatus::Paid);
    assert_eq!(target_status(EventType::PaymentDeclined), OrderStatus::Declined);
    assert_eq!(target_status(EventType::PaymentRefunded), OrderStatus::Refunded);
    assert_eq!(target_status(EventType::Chargeback), OrderStatus::Chargeback);
    assert_eq!(target_status(EventType::PixExpired), OrderStatus::Expired);
    assert_eq!(target_status(EventType::OrderCanceled), OrderStatus::Canceled);
    assert_eq!(
        target_status(EventType::CheckoutAbandoned),
        OrderStatus::Abandoned
    );
}
