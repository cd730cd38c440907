use chrono::{NaiveTime, Utc, Weekday};
use pretty_assertions::assert_eq;
use serde_json::json;
use slotwise_db::models::{DbBooking, DbWeeklyHours};
use slotwise_core::models::booking::{BookingStatus, CancelledBy};
use uuid::Uuid;

fn draft_row() -> DbBooking {
    DbBooking {
        id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        expert_id: Uuid::new_v4(),
        start_time: None,
        end_time: None,
        duration_minutes: 30,
        timezone: "Asia/Kolkata".to_string(),
        price: 1500,
        status: "payment_pending".to_string(),
        payment_txn_id: None,
        paid_at: None,
        meeting_link: None,
        meeting_link_created_at: None,
        cancelled_by: None,
        cancelled_at: None,
        refund_amount: None,
        expires_at: Some(Utc::now()),
        intake: json!({
            "kind": "creator",
            "contact": { "name": "N", "email": "n@example.com", "phone": null },
            "topic": "content plan",
            "goals": null,
            "attachments": []
        }),
        created_at: Utc::now(),
    }
}

#[test]
fn test_row_converts_into_domain_booking() {
    let row = draft_row();
    let id = row.id;

    let booking = row.into_booking().unwrap();
    assert_eq!(booking.id, id);
    assert_eq!(booking.status, BookingStatus::PaymentPending);
    assert!(!booking.has_slot());
    assert!(!booking.is_occupying());
    assert_eq!(booking.intake.contact().email, "n@example.com");
}

#[test]
fn test_row_with_unknown_status_is_rejected() {
    let mut row = draft_row();
    row.status = "limbo".to_string();
    assert!(row.into_booking().is_err());
}

#[test]
fn test_row_with_malformed_intake_is_rejected() {
    let mut row = draft_row();
    row.intake = json!({ "kind": "unknown_variant" });
    assert!(row.into_booking().is_err());
}

#[test]
fn test_cancelled_row_round_trips_party() {
    let mut row = draft_row();
    row.status = "cancelled".to_string();
    row.cancelled_by = Some("admin".to_string());
    row.cancelled_at = Some(Utc::now());
    row.expires_at = None;

    let booking = row.into_booking().unwrap();
    assert_eq!(booking.cancelled_by, Some(CancelledBy::Admin));
    assert!(booking.status.is_terminal());
}

#[test]
fn test_weekday_mapping() {
    let hours = DbWeeklyHours {
        id: Uuid::new_v4(),
        expert_id: Uuid::new_v4(),
        weekday: 0,
        open_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        close_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    };
    assert_eq!(hours.into_weekly_hours().unwrap().weekday, Weekday::Mon);

    let bad = DbWeeklyHours {
        id: Uuid::new_v4(),
        expert_id: Uuid::new_v4(),
        weekday: 7,
        open_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        close_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    };
    assert!(bad.into_weekly_hours().is_err());
}
