use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};
use crate::models::intake::IntakePayload;

/// Authoritative lifecycle status of a booking.
///
/// `payment_pending` is the only initial state; `completed`, `cancelled`
/// and `refunded` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    PaymentPending,
    Paid,
    Confirmed,
    Completed,
    Cancelled,
    Refunded,
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::Refunded
        )
    }

    /// True once the customer's money has been captured (paid or any state
    /// reachable from it, including refunded).
    pub fn has_reached_paid(&self) -> bool {
        !matches!(self, BookingStatus::PaymentPending | BookingStatus::Cancelled)
    }

    /// Whether a booking in this status blocks its time window for other
    /// customers. Drafts occupy only once a slot has been claimed.
    pub fn is_occupying(&self, has_slot: bool) -> bool {
        match self {
            BookingStatus::Paid | BookingStatus::Confirmed => true,
            BookingStatus::PaymentPending => has_slot,
            _ => false,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::PaymentPending => "payment_pending",
            BookingStatus::Paid => "paid",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Refunded => "refunded",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for BookingStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment_pending" => Ok(BookingStatus::PaymentPending),
            "paid" => Ok(BookingStatus::Paid),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "refunded" => Ok(BookingStatus::Refunded),
            other => Err(BookingError::Validation(format!(
                "Unknown booking status: {}",
                other
            ))),
        }
    }
}

/// Who requested a cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelledBy {
    Customer,
    Admin,
}

impl fmt::Display for CancelledBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelledBy::Customer => write!(f, "customer"),
            CancelledBy::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for CancelledBy {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(CancelledBy::Customer),
            "admin" => Ok(CancelledBy::Admin),
            other => Err(BookingError::Validation(format!(
                "Unknown cancelling party: {}",
                other
            ))),
        }
    }
}

/// Events that may advance a booking's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingEvent {
    PaymentConfirmed,
    MeetingIssued,
    SessionCompleted,
    CancellationRequested,
    RefundIssued,
}

impl fmt::Display for BookingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingEvent::PaymentConfirmed => "payment confirmed",
            BookingEvent::MeetingIssued => "meeting issued",
            BookingEvent::SessionCompleted => "session completed",
            BookingEvent::CancellationRequested => "cancellation requested",
            BookingEvent::RefundIssued => "refund issued",
        };
        write!(f, "{}", s)
    }
}

/// The full transition table. Every mutation path goes through this before
/// writing, so an illegal transition can never reach the store.
pub fn next_status(from: BookingStatus, event: BookingEvent) -> BookingResult<BookingStatus> {
    use BookingEvent::*;
    use BookingStatus::*;

    match (from, event) {
        (PaymentPending, PaymentConfirmed) => Ok(Paid),
        (Paid, MeetingIssued) => Ok(Confirmed),
        (Confirmed, SessionCompleted) => Ok(Completed),
        (PaymentPending | Paid | Confirmed, CancellationRequested) => Ok(Cancelled),
        (Paid | Confirmed, RefundIssued) => Ok(Refunded),
        (from, event) => Err(BookingError::InvalidTransition(format!(
            "cannot apply '{}' to a booking in status '{}'",
            event, from
        ))),
    }
}

/// Outcome of evaluating a payment confirmation against a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentDecision {
    /// Advance the booking to `paid`.
    Apply,
    /// Re-delivery for an already-captured booking; apply nothing.
    AlreadyPaid,
}

/// Decides whether a payment confirmation may be applied.
///
/// Pure confirmation policy: re-deliveries for already-captured bookings
/// are no-ops, a draft that expired unpaid counts as reaped even if the
/// sweep has not removed the row yet (its window may already belong to
/// another booking), and the notified amount must equal the snapshotted
/// price exactly.
pub fn decide_payment(
    status: BookingStatus,
    expires_at: Option<DateTime<Utc>>,
    price: i64,
    amount: i64,
    now: DateTime<Utc>,
) -> BookingResult<PaymentDecision> {
    if status.has_reached_paid() {
        return Ok(PaymentDecision::AlreadyPaid);
    }
    if status == BookingStatus::PaymentPending && expires_at.is_some_and(|exp| exp <= now) {
        return Err(BookingError::DraftNotEligible(
            "draft expired before payment was confirmed".to_string(),
        ));
    }
    next_status(status, BookingEvent::PaymentConfirmed)?;
    if amount != price {
        return Err(BookingError::AmountMismatch {
            expected: price,
            got: amount,
        });
    }
    Ok(PaymentDecision::Apply)
}

/// The central entity: one customer's session with one expert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub expert_id: Uuid,
    /// Both absent until a slot is claimed, then `end_time == start_time + duration`.
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: i32,
    /// Civil timezone used for display; always the fixed booking timezone.
    pub timezone: String,
    /// Price snapshotted from the expert at draft creation, in rupees.
    pub price: i64,
    pub status: BookingStatus,
    pub payment_txn_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub meeting_link: Option<String>,
    pub meeting_link_created_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<CancelledBy>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub refund_amount: Option<i64>,
    /// Present exactly while status is `payment_pending`.
    pub expires_at: Option<DateTime<Utc>>,
    pub intake: IntakePayload,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn has_slot(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn is_occupying(&self) -> bool {
        self.status.is_occupying(self.has_slot())
    }
}

// ---------------------------------------------------------------------------
// Request / response DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub customer_id: Uuid,
    pub expert_id: Uuid,
    pub duration_minutes: i32,
    pub intake: IntakePayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingResponse {
    pub id: Uuid,
    pub price: i64,
    pub status: BookingStatus,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimSlotRequest {
    pub date: NaiveDate,
    /// Slot window string as returned by the availability query, `"HH:MM-HH:MM"`.
    pub slot: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimSlotResponse {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Where to send the customer to authorize payment.
    pub redirect_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDetailResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub expert_id: Uuid,
    pub status: BookingStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: i32,
    pub timezone: String,
    pub price: i64,
    pub paid_at: Option<DateTime<Utc>>,
    /// Only populated once the booking has reached `paid`.
    pub meeting_link: Option<String>,
    pub cancelled_by: Option<CancelledBy>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub refund_amount: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingDetailResponse {
    fn from(b: Booking) -> Self {
        // The meeting link is withheld from anyone looking at an unpaid
        // booking; it only becomes visible once payment is captured.
        let meeting_link = if b.status.has_reached_paid() {
            b.meeting_link
        } else {
            None
        };
        BookingDetailResponse {
            id: b.id,
            customer_id: b.customer_id,
            expert_id: b.expert_id,
            status: b.status,
            start_time: b.start_time,
            end_time: b.end_time,
            duration_minutes: b.duration_minutes,
            timezone: b.timezone,
            price: b.price,
            paid_at: b.paid_at,
            meeting_link,
            cancelled_by: b.cancelled_by,
            cancelled_at: b.cancelled_at,
            refund_amount: b.refund_amount,
            expires_at: b.expires_at,
            created_at: b.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBookingRequest {
    pub actor: CancelledBy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundBookingRequest {
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingStatusResponse {
    pub id: Uuid,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    /// Civil date in the booking timezone, then ordered slot-window strings.
    pub days: BTreeMap<NaiveDate, Vec<String>>,
}

/// Asynchronous notification from the payment gateway, at-least-once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentNotification {
    pub booking_id: Uuid,
    pub txn_id: String,
    pub amount: i64,
    pub outcome: PaymentOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Success,
    Failure,
}
