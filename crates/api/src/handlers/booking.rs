//! # Booking Handlers
//!
//! The booking lifecycle commands: create a slot-less draft, claim a slot
//! (which triggers payment authorization), read details, cancel, refund,
//! complete.
//!
//! The claim path is the concurrency-sensitive one: the atomic claim runs
//! inside `slotwise_db::repositories::booking::claim_slot`, and the
//! payment-gateway call is issued strictly after that transaction commits.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use slotwise_core::availability::{self, SlotWindow};
use slotwise_core::errors::BookingError;
use slotwise_core::models::booking::{
    BookingDetailResponse, BookingStatusResponse, CancelBookingRequest, ClaimSlotRequest,
    ClaimSlotResponse, CreateBookingRequest, CreateBookingResponse, RefundBookingRequest,
};
use slotwise_core::BOOKING_TIMEZONE;
use slotwise_db::repositories::{booking as booking_repo, expert as expert_repo};
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

/// Creates a draft booking: intake captured, price snapshotted, no slot
/// bound yet. The draft holds for the configured expiry window.
#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<Json<CreateBookingResponse>, AppError> {
    payload.intake.validate()?;

    let expert = expert_repo::get_expert(&state.db_pool, payload.expert_id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| {
            BookingError::ExpertUnavailable(format!("Expert {} not found", payload.expert_id))
        })?;
    if !expert.active {
        return Err(AppError(BookingError::ExpertUnavailable(format!(
            "Expert {} is not taking bookings",
            payload.expert_id
        ))));
    }
    if !expert.accepts_duration(payload.duration_minutes) {
        return Err(AppError(BookingError::InvalidDuration(
            payload.duration_minutes,
        )));
    }

    let expires_at = Utc::now() + state.draft_expiry;
    let booking = booking_repo::create_draft(
        &state.db_pool,
        payload.customer_id,
        payload.expert_id,
        payload.duration_minutes,
        &BOOKING_TIMEZONE.to_string(),
        expert.price,
        &payload.intake,
        expires_at,
    )
    .await?;

    Ok(Json(CreateBookingResponse {
        id: booking.id,
        price: booking.price,
        status: booking.status,
        expires_at,
    }))
}

/// Returns the full booking record. The meeting link is withheld until
/// the booking has reached `paid`.
#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingDetailResponse>, AppError> {
    let booking = booking_repo::get_booking(&state.db_pool, id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {} not found", id)))?;

    Ok(Json(booking.into()))
}

/// Binds a chosen slot window to a draft and requests payment
/// authorization.
///
/// The window is first validated against the expert's schedule for that
/// date (alignment, blackouts, future-only); occupancy is then decided by
/// the atomic claim, so a lost race surfaces as a 409 `SlotAlreadyTaken`
/// and the client can re-fetch availability and retry.
#[axum::debug_handler]
pub async fn claim_slot(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClaimSlotRequest>,
) -> Result<Json<ClaimSlotResponse>, AppError> {
    let window = SlotWindow::from_str(&payload.slot)?;

    let booking = booking_repo::get_booking(&state.db_pool, id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {} not found", id)))?;

    let expert = expert_repo::get_expert(&state.db_pool, booking.expert_id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| {
            BookingError::ExpertUnavailable(format!("Expert {} not found", booking.expert_id))
        })?;
    if !expert.active {
        return Err(AppError(BookingError::ExpertUnavailable(format!(
            "Expert {} is not taking bookings",
            booking.expert_id
        ))));
    }

    // Validate the window against the schedule alone (no busy intervals):
    // alignment with the day's open boundary, blackouts, and the
    // strictly-in-the-future rule. Occupancy is the claim's job.
    let schedule_days = availability::available_windows(
        &expert.weekly_hours,
        &expert.blackouts,
        &[],
        booking.duration_minutes,
        Utc::now(),
        state.horizon_days,
        BOOKING_TIMEZONE,
    )?;
    let day_ok = schedule_days
        .get(&payload.date)
        .is_some_and(|windows| windows.contains(&window));
    if !day_ok {
        return Err(AppError(BookingError::Validation(format!(
            "{} on {} is not a bookable window for this expert",
            payload.slot, payload.date
        ))));
    }

    let (start_time, end_time) = availability::slot_to_utc(payload.date, window, BOOKING_TIMEZONE)?;
    let claimed = booking_repo::claim_slot(&state.db_pool, id, start_time, end_time).await?;

    // Gateway call strictly after the transaction has committed. A failure
    // here is an unknown outcome: the slot stays claimed and the draft
    // stays payment_pending until the webhook or the expiry window decides.
    let redirect_url = state
        .payment_gateway
        .authorize(claimed.id, claimed.price, &claimed.intake.contact().email)
        .await
        .map_err(|e| {
            tracing::error!(
                "Payment authorization request failed for booking {} (outcome unknown): {}",
                claimed.id, e
            );
            BookingError::Internal(format!("Payment authorization failed: {}", e).into())
        })?;

    Ok(Json(ClaimSlotResponse {
        id: claimed.id,
        start_time,
        end_time,
        redirect_url,
    }))
}

/// Cancels a booking on behalf of the customer or an admin.
#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelBookingRequest>,
) -> Result<Json<BookingStatusResponse>, AppError> {
    let booking = booking_repo::cancel(&state.db_pool, id, payload.actor).await?;
    Ok(Json(BookingStatusResponse {
        id: booking.id,
        status: booking.status,
    }))
}

/// Issues a refund for a paid or confirmed booking.
#[axum::debug_handler]
pub async fn refund_booking(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RefundBookingRequest>,
) -> Result<Json<BookingStatusResponse>, AppError> {
    let booking = booking_repo::refund(&state.db_pool, id, payload.amount).await?;
    Ok(Json(BookingStatusResponse {
        id: booking.id,
        status: booking.status,
    }))
}

/// Marks a confirmed session as held.
#[axum::debug_handler]
pub async fn complete_booking(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingStatusResponse>, AppError> {
    let booking = booking_repo::complete(&state.db_pool, id).await?;
    Ok(Json(BookingStatusResponse {
        id: booking.id,
        status: booking.status,
    }))
}
