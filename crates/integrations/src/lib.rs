//! # Slotwise Integrations
//!
//! HTTP clients for the two external collaborators the booking engine
//! depends on: the payment gateway (authorization + asynchronous webhook)
//! and the meeting-link issuer. Both sit behind narrow traits so handlers
//! can be exercised with mocks.
//!
//! Neither client is ever invoked while a database transaction is open.
//! Gateway timeouts are an *unknown* outcome: the booking stays
//! `payment_pending` until a definitive webhook arrives or the draft
//! expires.

pub mod config;
pub mod meeting;
pub mod payment;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::Result;
use mockall::automock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment-authorization boundary: authorize now, confirm later through
/// the webhook.
#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Requests authorization for `amount` and returns the URL the
    /// customer is redirected to.
    async fn authorize(&self, booking_id: Uuid, amount: i64, payer_email: &str)
    -> Result<String>;
}

/// What the meeting issuer needs to schedule a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingRequest {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendee_emails: Vec<String>,
    pub attachment_urls: Vec<String>,
}

/// Meeting-link issuance boundary. May fail independently of payment
/// state; callers treat failure as best-effort and never roll back.
#[automock]
#[async_trait]
pub trait MeetingIssuer: Send + Sync {
    async fn create_meeting(&self, request: MeetingRequest) -> Result<String>;
}
