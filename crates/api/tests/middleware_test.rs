use axum::http::StatusCode;
use axum::response::IntoResponse;
use rstest::rstest;
use slotwise_api::middleware::error_handling::AppError;
use slotwise_core::errors::BookingError;

#[rstest]
#[case(BookingError::NotFound("booking".to_string()), StatusCode::NOT_FOUND)]
#[case(BookingError::Validation("bad slot".to_string()), StatusCode::BAD_REQUEST)]
#[case(BookingError::InvalidDuration(45), StatusCode::BAD_REQUEST)]
#[case(BookingError::SlotAlreadyTaken, StatusCode::CONFLICT)]
#[case(BookingError::DraftNotEligible("already bound".to_string()), StatusCode::CONFLICT)]
#[case(BookingError::InvalidTransition("no".to_string()), StatusCode::CONFLICT)]
#[case(BookingError::ExpertUnavailable("inactive".to_string()), StatusCode::UNPROCESSABLE_ENTITY)]
#[case(
    BookingError::AmountMismatch { expected: 1500, got: 1450 },
    StatusCode::UNPROCESSABLE_ENTITY
)]
fn test_error_status_mapping(#[case] err: BookingError, #[case] expected: StatusCode) {
    let response = AppError(err).into_response();
    assert_eq!(response.status(), expected);
}

#[test]
fn test_database_errors_are_internal() {
    let err = AppError(BookingError::Database(eyre::eyre!("pool exhausted")));
    assert_eq!(
        err.into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_slot_taken_message_tells_customer_to_retry() {
    // The 409 body carries the "pick another time" guidance, distinct
    // from a generic failure page.
    let message = BookingError::SlotAlreadyTaken.to_string();
    assert!(message.contains("pick another time"));
}
