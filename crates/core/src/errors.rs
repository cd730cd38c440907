use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Expert unavailable: {0}")]
    ExpertUnavailable(String),

    #[error("Invalid duration: {0} minutes is not offered by this expert")]
    InvalidDuration(i32),

    #[error("Slot already taken, please pick another time")]
    SlotAlreadyTaken,

    #[error("Draft not eligible: {0}")]
    DraftNotEligible(String),

    #[error("Illegal status transition: {0}")]
    InvalidTransition(String),

    #[error("Payment amount mismatch: expected {expected}, got {got}")]
    AmountMismatch { expected: i64, got: i64 },

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type BookingResult<T> = Result<T, BookingError>;
