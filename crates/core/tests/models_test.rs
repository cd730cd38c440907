use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::{from_str, from_value, json, to_string};
use slotwise_core::MAX_INTAKE_ATTACHMENTS;
use slotwise_core::models::booking::{
    Booking, BookingDetailResponse, BookingStatus, CancelledBy, PaymentNotification,
};
use slotwise_core::models::intake::{AttachmentRef, ContactInfo, IntakePayload};
use uuid::Uuid;

fn contact() -> ContactInfo {
    ContactInfo {
        name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: Some("+91 98765 43210".to_string()),
    }
}

fn dermatology_intake() -> IntakePayload {
    IntakePayload::Dermatology {
        contact: contact(),
        skin_type: "combination".to_string(),
        concerns: vec!["acne".to_string(), "pigmentation".to_string()],
        current_routine: None,
        attachments: vec![],
    }
}

fn paid_booking() -> Booking {
    let start = Utc::now() + Duration::days(1);
    Booking {
        id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        expert_id: Uuid::new_v4(),
        start_time: Some(start),
        end_time: Some(start + Duration::minutes(30)),
        duration_minutes: 30,
        timezone: "Asia/Kolkata".to_string(),
        price: 1500,
        status: BookingStatus::Paid,
        payment_txn_id: Some("txn_123".to_string()),
        paid_at: Some(Utc::now()),
        meeting_link: Some("https://meet.example.com/abc".to_string()),
        meeting_link_created_at: Some(Utc::now()),
        cancelled_by: None,
        cancelled_at: None,
        refund_amount: None,
        expires_at: None,
        intake: dermatology_intake(),
        created_at: Utc::now(),
    }
}

#[test]
fn test_booking_serialization_round_trip() {
    let booking = paid_booking();

    let encoded = to_string(&booking).expect("Failed to serialize booking");
    let decoded: Booking = from_str(&encoded).expect("Failed to deserialize booking");

    assert_eq!(decoded.id, booking.id);
    assert_eq!(decoded.status, BookingStatus::Paid);
    assert_eq!(decoded.price, booking.price);
    assert_eq!(decoded.start_time, booking.start_time);
    assert_eq!(decoded.intake.contact().email, "asha@example.com");
}

#[test]
fn test_intake_payload_is_internally_tagged() {
    let encoded = serde_json::to_value(&dermatology_intake()).unwrap();
    assert_eq!(encoded["kind"], "dermatology");
    assert_eq!(encoded["skin_type"], "combination");

    let creator = IntakePayload::Creator {
        contact: contact(),
        topic: "skincare content strategy".to_string(),
        goals: None,
        attachments: vec![],
    };
    let encoded = serde_json::to_value(&creator).unwrap();
    assert_eq!(encoded["kind"], "creator");
}

#[test]
fn test_intake_attachments_default_to_empty() {
    let decoded: IntakePayload = from_value(json!({
        "kind": "creator",
        "contact": { "name": "N", "email": "n@example.com", "phone": null },
        "topic": "launch prep",
        "goals": null
    }))
    .unwrap();

    assert!(decoded.attachments().is_empty());
    assert!(decoded.validate().is_ok());
}

#[test]
fn test_intake_validation_rejects_missing_email() {
    let intake = IntakePayload::Creator {
        contact: ContactInfo {
            name: "N".to_string(),
            email: "  ".to_string(),
            phone: None,
        },
        topic: "t".to_string(),
        goals: None,
        attachments: vec![],
    };
    assert!(intake.validate().is_err());
}

#[test]
fn test_intake_validation_enforces_attachment_cap() {
    let attachment = AttachmentRef {
        file_name: "skin.jpg".to_string(),
        url: "https://cdn.example.com/skin.jpg".to_string(),
    };
    let intake = IntakePayload::Dermatology {
        contact: contact(),
        skin_type: "oily".to_string(),
        concerns: vec![],
        current_routine: None,
        attachments: vec![attachment; MAX_INTAKE_ATTACHMENTS + 1],
    };
    assert!(intake.validate().is_err());
}

#[test]
fn test_detail_response_hides_link_until_paid() {
    let mut booking = paid_booking();
    booking.status = BookingStatus::PaymentPending;
    booking.expires_at = Some(Utc::now() + Duration::minutes(15));

    let detail: BookingDetailResponse = booking.into();
    assert_eq!(detail.meeting_link, None);
}

#[test]
fn test_detail_response_exposes_link_once_paid() {
    let detail: BookingDetailResponse = paid_booking().into();
    assert_eq!(
        detail.meeting_link.as_deref(),
        Some("https://meet.example.com/abc")
    );
}

#[test]
fn test_payment_notification_deserializes_gateway_payload() {
    let decoded: PaymentNotification = from_value(json!({
        "booking_id": "7d4f6f0e-8a9b-4a57-9c38-0db9f2f2df10",
        "txn_id": "pay_9xK2",
        "amount": 1500,
        "outcome": "success"
    }))
    .unwrap();

    assert_eq!(decoded.txn_id, "pay_9xK2");
    assert_eq!(decoded.amount, 1500);
}

#[test]
fn test_cancelled_by_string_round_trip() {
    assert_eq!(CancelledBy::Customer.to_string(), "customer");
    assert_eq!(CancelledBy::Admin.to_string(), "admin");
    assert_eq!("admin".parse::<CancelledBy>().unwrap(), CancelledBy::Admin);
    assert!("expert".parse::<CancelledBy>().is_err());
}
