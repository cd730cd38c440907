//! Booking repository: every mutation re-reads current status inside its
//! transaction before writing, so concurrent claim / confirm / cancel paths
//! cannot lose updates. The partial unique index `uniq_booking_slot` backs
//! the in-transaction overlap check as the final arbiter of slot races.

use chrono::{DateTime, Utc};
use eyre::eyre;
use slotwise_core::errors::{BookingError, BookingResult};
use slotwise_core::models::booking::{
    Booking, BookingEvent, BookingStatus, CancelledBy, PaymentDecision, decide_payment,
    next_status,
};
use slotwise_core::models::intake::IntakePayload;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::DbBooking;

const BOOKING_COLUMNS: &str = "id, customer_id, expert_id, start_time, end_time, \
     duration_minutes, timezone, price, status, payment_txn_id, paid_at, \
     meeting_link, meeting_link_created_at, cancelled_by, cancelled_at, \
     refund_amount, expires_at, intake, created_at";

/// Occupying rows: money captured, or a live draft that has claimed a slot.
/// Expired drafts are invisible here even before the reaper deletes them.
const OCCUPYING_PREDICATE: &str = "(status IN ('paid', 'confirmed') \
     OR (status = 'payment_pending' AND start_time IS NOT NULL AND expires_at > NOW()))";

/// Maps driver errors to the domain taxonomy. A unique violation on the
/// slot index means another claim committed first.
fn map_db_err(e: sqlx::Error) -> BookingError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23505")
            && db_err.constraint() == Some("uniq_booking_slot")
        {
            return BookingError::SlotAlreadyTaken;
        }
    }
    BookingError::Database(eyre!(e))
}

/// Outcome of applying a payment confirmation.
#[derive(Debug, Clone)]
pub enum PaymentApplied {
    /// The booking advanced to `paid` in this call.
    Applied(Booking),
    /// The confirmation was a re-delivery; no side effects were applied.
    AlreadyPaid(Booking),
}

pub async fn create_draft(
    pool: &Pool<Postgres>,
    customer_id: Uuid,
    expert_id: Uuid,
    duration_minutes: i32,
    timezone: &str,
    price: i64,
    intake: &IntakePayload,
    expires_at: DateTime<Utc>,
) -> BookingResult<Booking> {
    let id = Uuid::new_v4();
    let intake_json = serde_json::to_value(intake)
        .map_err(|e| BookingError::Validation(format!("Unserializable intake payload: {}", e)))?;

    tracing::debug!(
        "Creating draft booking: id={}, customer={}, expert={}, duration={}min",
        id, customer_id, expert_id, duration_minutes
    );

    let row = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        INSERT INTO bookings
            (id, customer_id, expert_id, duration_minutes, timezone, price,
             status, expires_at, intake, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
        RETURNING {BOOKING_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(customer_id)
    .bind(expert_id)
    .bind(duration_minutes)
    .bind(timezone)
    .bind(price)
    .bind(BookingStatus::PaymentPending.to_string())
    .bind(expires_at)
    .bind(intake_json)
    .fetch_one(pool)
    .await
    .map_err(map_db_err)?;

    row.into_booking()
}

/// Fetches a booking by id. An unpaid draft past its expiry is treated as
/// already reaped and reported as absent.
pub async fn get_booking(pool: &Pool<Postgres>, id: Uuid) -> BookingResult<Option<Booking>> {
    let row = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE id = $1
          AND NOT (status = 'payment_pending' AND expires_at <= NOW())
        "#,
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(map_db_err)?;

    row.map(DbBooking::into_booking).transpose()
}

/// Intervals currently held against an expert, for the availability
/// calculator. `exclude` drops one booking (the caller's own draft).
pub async fn occupying_intervals(
    pool: &Pool<Postgres>,
    expert_id: Uuid,
    exclude: Option<Uuid>,
) -> BookingResult<Vec<(DateTime<Utc>, DateTime<Utc>)>> {
    let rows: Vec<(DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(&format!(
        r#"
        SELECT start_time, end_time
        FROM bookings
        WHERE expert_id = $1
          AND start_time IS NOT NULL
          AND ($2::uuid IS NULL OR id <> $2)
          AND {OCCUPYING_PREDICATE}
        ORDER BY start_time
        "#,
    ))
    .bind(expert_id)
    .bind(exclude)
    .fetch_all(pool)
    .await
    .map_err(map_db_err)?;

    Ok(rows)
}

/// Atomically binds a time window to a draft booking, exclusively.
///
/// One claim attempt per draft: the draft must still be `payment_pending`,
/// unexpired, and slot-less. The expert is re-checked and the window is
/// tested against every other occupying booking inside the same
/// transaction; a race that slips past the overlap check is caught by the
/// unique index at commit and surfaces as `SlotAlreadyTaken`.
///
/// Payment-gateway calls happen strictly after this function returns; no
/// network I/O runs while the transaction is open.
pub async fn claim_slot(
    pool: &Pool<Postgres>,
    booking_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> BookingResult<Booking> {
    let mut tx = pool.begin().await.map_err(map_db_err)?;

    let row = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE id = $1
        FOR UPDATE
        "#,
    ))
    .bind(booking_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(map_db_err)?
    .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {} not found", booking_id)))?;

    let status = row.status()?;
    if status != BookingStatus::PaymentPending {
        return Err(BookingError::DraftNotEligible(format!(
            "booking {} is in status '{}', not awaiting a slot",
            booking_id, status
        )));
    }
    if row.start_time.is_some() {
        return Err(BookingError::DraftNotEligible(format!(
            "booking {} already has a slot bound",
            booking_id
        )));
    }
    if row.expires_at.is_some_and(|exp| exp <= Utc::now()) {
        return Err(BookingError::DraftNotEligible(format!(
            "booking {} has expired",
            booking_id
        )));
    }

    let expected = chrono::Duration::minutes(i64::from(row.duration_minutes));
    if end_time - start_time != expected {
        return Err(BookingError::Validation(format!(
            "Requested window does not match the booked duration of {} minutes",
            row.duration_minutes
        )));
    }

    let active: Option<bool> = sqlx::query_scalar("SELECT active FROM experts WHERE id = $1")
        .bind(row.expert_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err)?;
    if !active.unwrap_or(false) {
        return Err(BookingError::ExpertUnavailable(format!(
            "Expert {} is no longer taking bookings",
            row.expert_id
        )));
    }

    // An expired draft still owns its unique-index entry until the sweep
    // runs; remove any in the way so this claim wins immediately instead
    // of bouncing off `uniq_booking_slot`.
    sqlx::query(
        r#"
        DELETE FROM bookings
        WHERE expert_id = $1
          AND id <> $2
          AND status = 'payment_pending'
          AND start_time IS NOT NULL
          AND expires_at <= NOW()
        "#,
    )
    .bind(row.expert_id)
    .bind(booking_id)
    .execute(&mut *tx)
    .await
    .map_err(map_db_err)?;

    let conflicts: i64 = sqlx::query_scalar(&format!(
        r#"
        SELECT COUNT(*)
        FROM bookings
        WHERE expert_id = $1
          AND id <> $2
          AND start_time IS NOT NULL
          AND start_time < $4
          AND end_time > $3
          AND {OCCUPYING_PREDICATE}
        "#,
    ))
    .bind(row.expert_id)
    .bind(booking_id)
    .bind(start_time)
    .bind(end_time)
    .fetch_one(&mut *tx)
    .await
    .map_err(map_db_err)?;
    if conflicts > 0 {
        return Err(BookingError::SlotAlreadyTaken);
    }

    let updated = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        UPDATE bookings
        SET start_time = $2, end_time = $3
        WHERE id = $1
        RETURNING {BOOKING_COLUMNS}
        "#,
    ))
    .bind(booking_id)
    .bind(start_time)
    .bind(end_time)
    .fetch_one(&mut *tx)
    .await
    .map_err(map_db_err)?;

    // Under weaker isolation the unique violation can also surface here.
    tx.commit().await.map_err(map_db_err)?;

    tracing::info!(
        "Slot claimed: booking={}, expert={}, window={} - {}",
        booking_id, updated.expert_id, start_time, end_time
    );
    updated.into_booking()
}

/// Applies a payment confirmation idempotently.
///
/// Re-delivery of a confirmation for an already-paid booking is a no-op.
/// A draft that expired unpaid counts as reaped, even if the sweep has
/// not removed the row yet; its window may already belong to someone
/// else. An amount differing from the snapshotted price is a hard
/// failure; the booking stays `payment_pending`.
pub async fn mark_paid(
    pool: &Pool<Postgres>,
    booking_id: Uuid,
    txn_id: &str,
    amount: i64,
) -> BookingResult<PaymentApplied> {
    let mut tx = pool.begin().await.map_err(map_db_err)?;

    let row = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE id = $1
        FOR UPDATE
        "#,
    ))
    .bind(booking_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(map_db_err)?
    .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {} not found", booking_id)))?;

    let status = row.status()?;
    match decide_payment(status, row.expires_at, row.price, amount, Utc::now())? {
        PaymentDecision::AlreadyPaid => {
            tracing::info!(
                "Payment confirmation re-delivered for booking {} (status '{}'), ignoring",
                booking_id, status
            );
            return Ok(PaymentApplied::AlreadyPaid(row.into_booking()?));
        }
        PaymentDecision::Apply => {}
    }
    let next = next_status(status, BookingEvent::PaymentConfirmed)?;

    let updated = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        UPDATE bookings
        SET status = $2, payment_txn_id = $3, paid_at = NOW(), expires_at = NULL
        WHERE id = $1
        RETURNING {BOOKING_COLUMNS}
        "#,
    ))
    .bind(booking_id)
    .bind(next.to_string())
    .bind(txn_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(map_db_err)?;

    tx.commit().await.map_err(map_db_err)?;

    tracing::info!("Payment captured: booking={}, txn={}", booking_id, txn_id);
    Ok(PaymentApplied::Applied(updated.into_booking()?))
}

/// Records an issued meeting link, advancing `paid` to `confirmed`.
pub async fn confirm_meeting(
    pool: &Pool<Postgres>,
    booking_id: Uuid,
    meeting_link: &str,
) -> BookingResult<Booking> {
    transition_booking(pool, booking_id, BookingEvent::MeetingIssued, |_, next| {
        Ok((
            format!(
                r#"
                UPDATE bookings
                SET status = $2, meeting_link = $3, meeting_link_created_at = NOW()
                WHERE id = $1
                RETURNING {BOOKING_COLUMNS}
                "#,
            ),
            BindArgs {
                status: next,
                text: Some(meeting_link.to_string()),
                amount: None,
            },
        ))
    })
    .await
}

/// Cancels a booking, recording the requesting party. The meeting link is
/// cleared so it cannot be reused.
pub async fn cancel(
    pool: &Pool<Postgres>,
    booking_id: Uuid,
    party: CancelledBy,
) -> BookingResult<Booking> {
    transition_booking(
        pool,
        booking_id,
        BookingEvent::CancellationRequested,
        |_, next| {
            Ok((
                format!(
                    r#"
                    UPDATE bookings
                    SET status = $2, cancelled_by = $3, cancelled_at = NOW(),
                        meeting_link = NULL, meeting_link_created_at = NULL,
                        expires_at = NULL
                    WHERE id = $1
                    RETURNING {BOOKING_COLUMNS}
                    "#,
                ),
                BindArgs {
                    status: next,
                    text: Some(party.to_string()),
                    amount: None,
                },
            ))
        },
    )
    .await
}

/// Issues a refund for a paid or confirmed booking; `amount` may not
/// exceed the snapshotted price.
pub async fn refund(
    pool: &Pool<Postgres>,
    booking_id: Uuid,
    amount: i64,
) -> BookingResult<Booking> {
    if amount < 0 {
        return Err(BookingError::Validation(
            "Refund amount must not be negative".to_string(),
        ));
    }
    transition_booking(pool, booking_id, BookingEvent::RefundIssued, |row, next| {
        if amount > row.price {
            return Err(BookingError::Validation(format!(
                "Refund of {} exceeds the booking price of {}",
                amount, row.price
            )));
        }
        Ok((
            format!(
                r#"
                UPDATE bookings
                SET status = $2, refund_amount = $3
                WHERE id = $1
                RETURNING {BOOKING_COLUMNS}
                "#,
            ),
            BindArgs {
                status: next,
                text: None,
                amount: Some(amount),
            },
        ))
    })
    .await
}

/// Marks a confirmed session as held.
pub async fn complete(pool: &Pool<Postgres>, booking_id: Uuid) -> BookingResult<Booking> {
    transition_booking(pool, booking_id, BookingEvent::SessionCompleted, |_, next| {
        Ok((
            format!(
                r#"
                UPDATE bookings
                SET status = $2
                WHERE id = $1
                RETURNING {BOOKING_COLUMNS}
                "#,
            ),
            BindArgs {
                status: next,
                text: None,
                amount: None,
            },
        ))
    })
    .await
}

struct BindArgs {
    status: BookingStatus,
    text: Option<String>,
    amount: Option<i64>,
}

/// Shared read-check-write skeleton for the simple transitions: lock the
/// row, validate the event against the transition table, write, commit.
async fn transition_booking<F>(
    pool: &Pool<Postgres>,
    booking_id: Uuid,
    event: BookingEvent,
    build: F,
) -> BookingResult<Booking>
where
    F: FnOnce(&DbBooking, BookingStatus) -> BookingResult<(String, BindArgs)>,
{
    let mut tx = pool.begin().await.map_err(map_db_err)?;

    let row = sqlx::query_as::<_, DbBooking>(&format!(
        r#"
        SELECT {BOOKING_COLUMNS}
        FROM bookings
        WHERE id = $1
        FOR UPDATE
        "#,
    ))
    .bind(booking_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(map_db_err)?
    .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {} not found", booking_id)))?;

    let status = row.status()?;
    let next = next_status(status, event)?;

    let (sql, args) = build(&row, next)?;
    let mut query = sqlx::query_as::<_, DbBooking>(&sql)
        .bind(booking_id)
        .bind(args.status.to_string());
    if let Some(text) = args.text {
        query = query.bind(text);
    }
    if let Some(amount) = args.amount {
        query = query.bind(amount);
    }
    let updated = query.fetch_one(&mut *tx).await.map_err(map_db_err)?;

    tx.commit().await.map_err(map_db_err)?;

    tracing::info!(
        "Booking {} transitioned '{}' -> '{}' ({})",
        booking_id, status, next, event
    );
    updated.into_booking()
}

/// Idempotent expiry sweep: removes unpaid drafts past their deadline.
/// The status re-check lives inside the DELETE predicate, so a row paid
/// microseconds earlier is never deleted.
pub async fn delete_expired_drafts(pool: &Pool<Postgres>) -> BookingResult<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM bookings
        WHERE status = 'payment_pending'
          AND expires_at <= NOW()
        "#,
    )
    .execute(pool)
    .await
    .map_err(map_db_err)?;

    let reaped = result.rows_affected();
    if reaped > 0 {
        tracing::info!("Reaped {} expired draft booking(s)", reaped);
    }
    Ok(reaped)
}
