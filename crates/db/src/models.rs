use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use slotwise_core::errors::{BookingError, BookingResult};
use slotwise_core::models::booking::{Booking, BookingStatus, CancelledBy};
use slotwise_core::models::expert::{Blackout, WeeklyHours};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbExpert {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
    pub accepted_durations: Vec<i32>,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbWeeklyHours {
    pub id: Uuid,
    pub expert_id: Uuid,
    /// 0 = Monday .. 6 = Sunday.
    pub weekday: i16,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
}

impl DbWeeklyHours {
    pub fn into_weekly_hours(self) -> BookingResult<WeeklyHours> {
        let weekday = match self.weekday {
            0 => Weekday::Mon,
            1 => Weekday::Tue,
            2 => Weekday::Wed,
            3 => Weekday::Thu,
            4 => Weekday::Fri,
            5 => Weekday::Sat,
            6 => Weekday::Sun,
            other => {
                return Err(BookingError::Validation(format!(
                    "Invalid weekday stored for expert {}: {}",
                    self.expert_id, other
                )));
            }
        };
        Ok(WeeklyHours {
            weekday,
            open: self.open_time,
            close: self.close_time,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBlackout {
    pub id: Uuid,
    pub expert_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reason: Option<String>,
}

impl From<DbBlackout> for Blackout {
    fn from(b: DbBlackout) -> Self {
        Blackout {
            start: b.start_time,
            end: b.end_time,
            reason: b.reason,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub expert_id: Uuid,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: i32,
    pub timezone: String,
    pub price: i64,
    pub status: String,
    pub payment_txn_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub meeting_link: Option<String>,
    pub meeting_link_created_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub refund_amount: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub intake: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl DbBooking {
    pub fn status(&self) -> BookingResult<BookingStatus> {
        BookingStatus::from_str(&self.status)
    }

    pub fn into_booking(self) -> BookingResult<Booking> {
        let status = BookingStatus::from_str(&self.status)?;
        let cancelled_by = self
            .cancelled_by
            .as_deref()
            .map(CancelledBy::from_str)
            .transpose()?;
        let intake = serde_json::from_value(self.intake).map_err(|e| {
            BookingError::Validation(format!(
                "Invalid intake payload stored for booking {}: {}",
                self.id, e
            ))
        })?;
        Ok(Booking {
            id: self.id,
            customer_id: self.customer_id,
            expert_id: self.expert_id,
            start_time: self.start_time,
            end_time: self.end_time,
            duration_minutes: self.duration_minutes,
            timezone: self.timezone,
            price: self.price,
            status,
            payment_txn_id: self.payment_txn_id,
            paid_at: self.paid_at,
            meeting_link: self.meeting_link,
            meeting_link_created_at: self.meeting_link_created_at,
            cancelled_by,
            cancelled_at: self.cancelled_at,
            refund_amount: self.refund_amount,
            expires_at: self.expires_at,
            intake,
            created_at: self.created_at,
        })
    }
}
