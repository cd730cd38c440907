//! # Availability Handler
//!
//! Computes the bookable windows for an expert over the configured
//! horizon. The computation itself is pure (`slotwise_core::availability`);
//! this handler validates the request, collects the expert's schedule and
//! the occupying bookings, and shapes the response.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use slotwise_core::models::booking::AvailabilityResponse;
use slotwise_core::{BOOKING_TIMEZONE, availability};
use slotwise_core::errors::BookingError;
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

/// Query parameters for the availability endpoint
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Requested session duration in minutes
    pub duration: i32,
}

/// Lists the open slot windows for an expert, one entry per civil day.
///
/// # Endpoint
///
/// ```text
/// GET /api/experts/:id/availability?duration=30
/// ```
///
/// Windows are duration-aligned from each day's opening time and exclude
/// blackouts, occupied intervals, and anything not strictly in the future.
#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<ApiState>>,
    Path(expert_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let expert = slotwise_db::repositories::expert::get_expert(&state.db_pool, expert_id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| {
            BookingError::ExpertUnavailable(format!("Expert {} not found", expert_id))
        })?;

    if !expert.active {
        return Err(AppError(BookingError::ExpertUnavailable(format!(
            "Expert {} is not taking bookings",
            expert_id
        ))));
    }
    if !expert.accepts_duration(query.duration) {
        return Err(AppError(BookingError::InvalidDuration(query.duration)));
    }

    let busy = slotwise_db::repositories::booking::occupying_intervals(
        &state.db_pool,
        expert_id,
        None,
    )
    .await?
    .into_iter()
    .map(|(start, end)| availability::BusyInterval { start, end })
    .collect::<Vec<_>>();

    let days = availability::available_windows(
        &expert.weekly_hours,
        &expert.blackouts,
        &busy,
        query.duration,
        Utc::now(),
        state.horizon_days,
        BOOKING_TIMEZONE,
    )?;

    let days = days
        .into_iter()
        .map(|(date, windows)| {
            let slots = windows.iter().map(ToString::to_string).collect();
            (date, slots)
        })
        .collect();

    Ok(Json(AvailabilityResponse { days }))
}
