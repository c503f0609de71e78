use checkout_payments::domain::order::{Order, OrderStatus};
use checkout_payments::forwarder::utmify::{
    convert, downstream_status, format_utc, idempotency_key, minor_to_major,
};
use chrono::TimeZone;
use uuid::Uuid;

#[test]
fn converts_minor_units_to_exact_decimal() {
    assert_eq!(minor_to_major(4358), 43.58);
    assert_eq!(minor_to_major(100), 1.0);
    assert_eq!(minor_to_major(99), 0.99);
    assert_eq!(minor_to_major(1), 0.01);
    assert_eq!(minor_to_major(1000000001), 10000000.01);
}

#[test]
fn payload_carries_major_unit_value() {
    let payload = convert(&order(OrderStatus::Paid, 4358)).expect("paid order must convert");
    assert_eq!(payload.valor, 43.58);
    assert_eq!(payload.status, "paid");
}

#[test]
fn abandoned_orders_are_never_forwarded() {
    assert!(downstream_status(OrderStatus::Abandoned).is_none());
    assert!(convert(&order(OrderStatus::Abandoned, 4358)).is_none());
}

#[test]
fn maps_statuses_to_downstream_vocabulary() {
    assert_eq!(downstream_status(OrderStatus::Initiated), Some("waiting_payment"));
    assert_eq!(downstream_status(OrderStatus::PixPending), Some("waiting_payment"));
    assert_eq!(downstream_status(OrderStatus::Authorized), Some("waiting_payment"));
    assert_eq!(downstream_status(OrderStatus::Paid), Some("paid"));
    assert_eq!(downstream_status(OrderStatus::Declined), Some("refused"));
    assert_eq!(downstream_status(OrderStatus::Canceled), Some("refused"));
    assert_eq!(downstream_status(OrderStatus::Refunded), Some("refunded"));
    assert_eq!(downstream_status(OrderStatus::Chargeback), Some("chargedback"));
}

#[test]
fn timestamps_use_utc_second_precision() {
    let mut o = order(OrderStatus::Paid, 500);
    o.paid_at = Some(chrono::Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap());

    let payload = convert(&o).unwrap();
    assert_eq!(payload.created_at, "2026-01-02 03:04:05");
    assert_eq!(payload.approved_date.as_deref(), Some("2026-03-14 15:09:26"));
    assert_eq!(payload.refunded_at, None);
}

#[test]
fn idempotency_key_uses_sentinel_without_approval() {
    let o = order(OrderStatus::PixPending, 500);
    let key = idempotency_key(&o);
    assert_eq!(key, format!("{}-waiting_payment-na", o.id));
}

#[test]
fn idempotency_key_includes_approval_timestamp() {
    let mut o = order(OrderStatus::Paid, 500);
    let paid = chrono::Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
    o.paid_at = Some(paid);

    let key = idempotency_key(&o);
    assert_eq!(key, format!("{}-paid-{}", o.id, paid.timestamp()));
}

#[test]
fn commission_stays_zero() {
    let payload = convert(&order(OrderStatus::Paid, 123456)).unwrap();
    assert_eq!(payload.commission, 0.0);
}

#[test]
fn tracking_params_and_test_flag_pass_through() {
    let mut o = order(OrderStatus::Paid, 500);
    o.tracking_params = serde_json::json!({"utm_source": "instagram", "utm_campaign": "launch"});
    o.is_test = true;

    let payload = convert(&o).unwrap();
    assert_eq!(
        payload.tracking_parameters,
        serde_json::json!({"utm_source": "instagram", "utm_campaign": "launch"})
    );
    assert!(payload.is_test);
}

#[test]
fn formats_utc_timestamps() {
    let ts = chrono::Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap();
    assert_eq!(format_utc(ts), "2026-12-31 23:59:59");
}

fn order(status: OrderStatus, amount_minor_units: i64) -> Order {
    Order {
        id: Uuid::new_v4(),
        seller_id: Uuid::new_v4(),
        status,
        amount_minor_units,
        payment_method: "pix".to_string(),
        gateway_transaction_id: Some("tx_123".to_string()),
        customer_name: "Maria Souza".to_string(),
        customer_email: "maria@example.com".to_string(),
        customer_document: Some("12345678900".to_string()),
        tracking_params: serde_json::json!({}),
        is_test: false,
        created_at: chrono::Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        paid_at: None,
        refunded_at: None,
    }
}
