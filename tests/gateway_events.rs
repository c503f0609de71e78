use checkout_payments::domain::event::EventType;
use checkout_payments::domain::order::OrderStatus;
use checkout_payments::gateways::normalize_tag;
use checkout_payments::gateways::pushingpay::{normalize, verify_signature, PushingPayEvent};
use chrono::TimeZone;
use hmac::{Hmac, Mac};
use sha2::Sha256;

#[test]
fn normalizes_the_closed_tag_vocabulary() {
    assert_eq!(normalize_tag("pix.created").unwrap(), EventType::PixGenerated);
    assert_eq!(normalize_tag("payment.approved").unwrap(), EventType::PaymentApproved);
    assert_eq!(normalize_tag("payment.declined").unwrap(), EventType::PaymentDeclined);
    assert_eq!(normalize_tag("payment.refunded").unwrap(), EventType::PaymentRefunded);
    assert_eq!(normalize_tag("payment.chargeback").unwrap(), EventType::Chargeback);
    assert_eq!(normalize_tag("pix.expired").unwrap(), EventType::PixExpired);
}

#[test]
fn unknown_tag_surfaces_the_raw_value() {
    let err = normalize_tag("boleto.generated").unwrap_err();
    assert_eq!(err.0, "boleto.generated");
    assert!(err.to_string().contains("boleto.generated"));
}

#[test]
fn normalize_maps_to_target_status_and_keeps_event_id() {
    let event = sample_event("payment.approved");
    let normalized = normalize(&event).unwrap();

    assert_eq!(normalized.event_type, EventType::PaymentApproved);
    assert_eq!(normalized.status, OrderStatus::Paid);
    assert_eq!(normalized.gateway_event_id, "evt_01");
}

#[test]
fn normalize_prefers_the_event_timestamp() {
    let mut event = sample_event("payment.approved");
    let paid = chrono::Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
    event.paid_at = Some(paid);

    let normalized = normalize(&event).unwrap();
    assert_eq!(normalized.occurred_at, paid);
}

#[test]
fn normalize_falls_back_to_processing_time() {
    let mut event = sample_event("pix.created");
    event.created_at = None;
    event.paid_at = None;

    let before = chrono::Utc::now();
    let normalized = normalize(&event).unwrap();
    let after = chrono::Utc::now();

    assert!(normalized.occurred_at >= before && normalized.occurred_at <= after);
}

#[test]
fn normalize_rejects_unknown_event_tags() {
    let event = sample_event("card.tokenized");
    let err = normalize(&event).unwrap_err();
    assert_eq!(err.0, "card.tokenized");
}

#[test]
fn signature_roundtrip_verifies() {
    let payload = br#"{"id":"evt_01","event":"payment.approved"}"#;
    let secret = "whsec_test";

    assert!(verify_signature(payload, &sign(payload, secret), secret));
}

#[test]
fn tampered_payload_fails_verification() {
    let payload = br#"{"id":"evt_01","event":"payment.approved"}"#;
    let secret = "whsec_test";
    let signature = sign(payload, secret);

    let tampered = br#"{"id":"evt_02","event":"payment.approved"}"#;
    assert!(!verify_signature(tampered, &signature, secret));
}

#[test]
fn wrong_secret_fails_verification() {
    let payload = br#"{"id":"evt_01"}"#;
    let signature = sign(payload, "whsec_test");
    assert!(!verify_signature(payload, &signature, "whsec_other"));
}

#[test]
fn malformed_hex_fails_verification() {
    assert!(!verify_signature(b"{}", "not-hex-at-all", "whsec_test"));
    assert!(!verify_signature(b"{}", "", "whsec_test"));
}

fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

fn sample_event(tag: &str) -> PushingPayEvent {
    PushingPayEvent {
        id: "evt_01".to_string(),
        event: tag.to_string(),
        transaction_id: "tx_123".to_string(),
        value: Some(4358),
        created_at: Some(chrono::Utc.with_ymd_and_hms(2026, 4, 30, 8, 30, 0).unwrap()),
        paid_at: None,
        expires_at: None,
        qr_code: None,
        qr_code_base64: None,
        reason: None,
    }
}
