//! # Availability Calculator
//!
//! Derives the bookable windows for an expert over a fixed forward horizon.
//! For each civil day the open/close window is discretized into
//! duration-sized increments anchored at the open boundary, then increments
//! are dropped when they would run past closing, intersect a blackout,
//! intersect an occupying booking, or start in the past.
//!
//! Anchoring increments at the open boundary (rather than allowing any
//! start offset) keeps slot boundaries predictable and makes the overlap
//! check against existing bookings cheap.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::{BookingError, BookingResult};
use crate::models::expert::{Blackout, WeeklyHours};

/// A contiguous `[start, end)` civil-time window within one day, equal in
/// length to the requested session duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl fmt::Display for SlotWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

impl FromStr for SlotWindow {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            BookingError::Validation(format!(
                "Invalid slot window '{}', expected HH:MM-HH:MM",
                s
            ))
        };
        let (start, end) = s.split_once('-').ok_or_else(invalid)?;
        let start = NaiveTime::parse_from_str(start, "%H:%M").map_err(|_| invalid())?;
        let end = NaiveTime::parse_from_str(end, "%H:%M").map_err(|_| invalid())?;
        if start >= end {
            return Err(BookingError::Validation(format!(
                "Slot window '{}' must start before it ends",
                s
            )));
        }
        Ok(SlotWindow { start, end })
    }
}

/// An interval already held by an occupying booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Half-open interval overlap: `[a_start, a_end)` intersects `[b_start, b_end)`.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Resolves a civil date + slot window to absolute UTC instants.
pub fn slot_to_utc(
    date: NaiveDate,
    window: SlotWindow,
    tz: Tz,
) -> BookingResult<(DateTime<Utc>, DateTime<Utc>)> {
    let to_utc = |time: NaiveTime| {
        tz.from_local_datetime(&date.and_time(time))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| {
                BookingError::Validation(format!(
                    "Time {} does not exist on {} in {}",
                    time, date, tz
                ))
            })
    };
    Ok((to_utc(window.start)?, to_utc(window.end)?))
}

/// Computes the ordered, non-overlapping candidate windows for each of the
/// next `horizon_days` civil days in the booking timezone.
///
/// `busy` must already be restricted to occupying bookings of the expert in
/// question; drafts without a claimed slot never appear in it.
pub fn available_windows(
    hours: &[WeeklyHours],
    blackouts: &[Blackout],
    busy: &[BusyInterval],
    duration_minutes: i32,
    now: DateTime<Utc>,
    horizon_days: u32,
    tz: Tz,
) -> BookingResult<BTreeMap<NaiveDate, Vec<SlotWindow>>> {
    if duration_minutes <= 0 {
        return Err(BookingError::Validation(
            "Session duration must be positive".to_string(),
        ));
    }
    let duration = Duration::minutes(i64::from(duration_minutes));
    let today = now.with_timezone(&tz).date_naive();

    let mut days = BTreeMap::new();
    for offset in 0..horizon_days {
        let date = today + Duration::days(i64::from(offset));
        let weekday = date.weekday();

        let mut windows = Vec::new();
        for day_hours in hours.iter().filter(|h| h.weekday == weekday) {
            let mut cursor = day_hours.open;
            // Duration-aligned increments from the open boundary; an
            // increment that would run past closing is rejected. A non-zero
            // wrap means the increment crossed midnight and left the day.
            loop {
                let (end, wrapped) = cursor.overflowing_add_signed(duration);
                if wrapped != 0 || end > day_hours.close {
                    break;
                }
                let window = SlotWindow { start: cursor, end };
                let (start_utc, end_utc) = slot_to_utc(date, window, tz)?;

                let in_past = start_utc <= now;
                let blacked_out = blackouts
                    .iter()
                    .any(|b| intervals_overlap(start_utc, end_utc, b.start, b.end));
                let occupied = busy
                    .iter()
                    .any(|b| intervals_overlap(start_utc, end_utc, b.start, b.end));

                if !in_past && !blacked_out && !occupied {
                    windows.push(window);
                }
                cursor = end;
            }
        }
        windows.sort_by_key(|w| w.start);
        days.insert(date, windows);
    }
    Ok(days)
}
