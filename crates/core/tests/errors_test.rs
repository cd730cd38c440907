use slotwise_core::errors::{BookingError, BookingResult};

#[test]
fn test_booking_error_display() {
    let not_found = BookingError::NotFound("Booking not found".to_string());
    let validation = BookingError::Validation("Invalid input".to_string());
    let unavailable = BookingError::ExpertUnavailable("Expert retired".to_string());
    let duration = BookingError::InvalidDuration(45);
    let taken = BookingError::SlotAlreadyTaken;
    let mismatch = BookingError::AmountMismatch {
        expected: 1500,
        got: 1450,
    };

    assert_eq!(not_found.to_string(), "Resource not found: Booking not found");
    assert_eq!(validation.to_string(), "Validation error: Invalid input");
    assert_eq!(unavailable.to_string(), "Expert unavailable: Expert retired");
    assert_eq!(
        duration.to_string(),
        "Invalid duration: 45 minutes is not offered by this expert"
    );
    assert_eq!(taken.to_string(), "Slot already taken, please pick another time");
    assert_eq!(
        mismatch.to_string(),
        "Payment amount mismatch: expected 1500, got 1450"
    );
}

#[test]
fn test_database_error_from_eyre() {
    let err: BookingError = eyre::eyre!("connection refused").into();
    assert!(err.to_string().contains("Database error"));
}

#[test]
fn test_booking_result() {
    let result: BookingResult<i32> = Ok(42);
    assert_eq!(result.unwrap(), 42);

    let result: BookingResult<i32> = Err(BookingError::SlotAlreadyTaken);
    assert!(result.is_err());
}
