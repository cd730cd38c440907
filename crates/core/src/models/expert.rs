use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recurring weekly opening hours for one day of the week.
///
/// `open` strictly precedes `close`; rows violating that never leave the
/// expert-profile subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyHours {
    pub weekday: Weekday,
    pub open: NaiveTime,
    pub close: NaiveTime,
}

/// An absolute range during which the expert takes no bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blackout {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Read-only snapshot of an expert as seen by the booking engine.
///
/// Owned by the expert-profile subsystem; this crate only consumes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expert {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
    /// Session lengths the expert offers, in minutes.
    pub accepted_durations: Vec<i32>,
    /// Price per session in whole rupees, snapshotted onto each draft.
    pub price: i64,
    pub weekly_hours: Vec<WeeklyHours>,
    pub blackouts: Vec<Blackout>,
}

impl Expert {
    pub fn accepts_duration(&self, minutes: i32) -> bool {
        self.accepted_durations.contains(&minutes)
    }
}
