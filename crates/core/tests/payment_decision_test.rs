use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use slotwise_core::errors::BookingError;
use slotwise_core::models::booking::{BookingStatus, PaymentDecision, decide_payment};

use BookingStatus::*;

#[test]
fn test_exact_amount_on_live_draft_is_applied() {
    let now = Utc::now();
    let decision =
        decide_payment(PaymentPending, Some(now + Duration::minutes(5)), 1500, 1500, now).unwrap();
    assert_eq!(decision, PaymentDecision::Apply);
}

#[rstest]
#[case(Paid)]
#[case(Confirmed)]
#[case(Completed)]
#[case(Refunded)]
fn test_redelivery_for_captured_booking_is_a_noop(#[case] status: BookingStatus) {
    let decision = decide_payment(status, None, 1500, 1500, Utc::now()).unwrap();
    assert_eq!(decision, PaymentDecision::AlreadyPaid);
}

#[rstest]
#[case(1450)] // short by 50
#[case(1550)] // overpaid
#[case(0)]
fn test_amount_must_match_price_exactly(#[case] amount: i64) {
    let now = Utc::now();
    let err = decide_payment(
        PaymentPending,
        Some(now + Duration::minutes(5)),
        1500,
        amount,
        now,
    )
    .unwrap_err();
    match err {
        BookingError::AmountMismatch { expected, got } => {
            assert_eq!(expected, 1500);
            assert_eq!(got, amount);
        }
        other => panic!("expected AmountMismatch, got {:?}", other),
    }
}

#[test]
fn test_late_confirmation_for_expired_draft_is_rejected() {
    // The draft expired unpaid, so its window may already belong to a
    // later booking with different boundaries. A late confirmation must
    // not resurrect it into a second occupying booking.
    let now = Utc::now();
    let err = decide_payment(
        PaymentPending,
        Some(now - Duration::minutes(1)),
        1500,
        1500,
        now,
    )
    .unwrap_err();
    assert!(matches!(err, BookingError::DraftNotEligible(_)));
}

#[test]
fn test_expiry_boundary_counts_as_expired() {
    let now = Utc::now();
    let err = decide_payment(PaymentPending, Some(now), 1500, 1500, now).unwrap_err();
    assert!(matches!(err, BookingError::DraftNotEligible(_)));
}

#[test]
fn test_confirmation_for_cancelled_booking_is_rejected() {
    let err = decide_payment(Cancelled, None, 1500, 1500, Utc::now()).unwrap_err();
    assert!(matches!(err, BookingError::InvalidTransition(_)));
}

#[test]
fn test_expiry_is_checked_before_amount() {
    // An expired draft with a wrong amount reports expiry, not mismatch
    let now = Utc::now();
    let err = decide_payment(
        PaymentPending,
        Some(now - Duration::minutes(1)),
        1500,
        1450,
        now,
    )
    .unwrap_err();
    assert!(matches!(err, BookingError::DraftNotEligible(_)));
}
