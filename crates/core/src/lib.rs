//! # Slotwise Core
//!
//! Domain models and pure logic for the Slotwise booking engine: the
//! availability calculator, the booking state machine, intake payloads and
//! the typed error taxonomy. This crate has no database or HTTP
//! dependencies; everything here is deterministic and testable in isolation.

pub mod availability;
pub mod errors;
pub mod models;

use chrono_tz::Tz;

/// The single civil timezone all schedules and slot strings are rendered in.
pub const BOOKING_TIMEZONE: Tz = chrono_tz::Asia::Kolkata;

/// Forward horizon of the availability calculator, in civil days.
pub const AVAILABILITY_HORIZON_DAYS: u32 = 14;

/// How long an unpaid draft booking holds before the reaper may remove it.
pub const DRAFT_EXPIRY_MINUTES: i64 = 15;

/// Upper bound on attachments carried in an intake payload.
pub const MAX_INTAKE_ATTACHMENTS: usize = 3;
