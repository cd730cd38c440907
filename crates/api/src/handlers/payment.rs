//! # Payment Confirmation Handler
//!
//! Consumes the payment gateway's webhook: at-least-once delivery,
//! possibly duplicated. The state change itself is idempotent
//! (`mark_paid`), and the gateway is acked for anything that a retry
//! cannot fix, so re-delivery storms never build up. Only transient
//! database failures return a 5xx, where a retry is desired and safe.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;
use slotwise_core::errors::BookingError;
use slotwise_core::models::booking::{Booking, PaymentNotification, PaymentOutcome};
use slotwise_db::repositories::booking as booking_repo;
use slotwise_integrations::MeetingRequest;

use crate::{ApiState, middleware::error_handling::AppError};

/// Acknowledgment body returned to the gateway.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

/// Processes an asynchronous payment notification.
///
/// # Endpoint
///
/// ```text
/// POST /api/webhooks/payment
/// ```
///
/// On success the booking advances to `paid` and a best-effort meeting
/// issuance follows; issuance failure never rolls the payment back.
/// Integrity problems (unknown booking, ineligible status, amount
/// mismatch) are logged for manual reconciliation and acked.
#[axum::debug_handler]
pub async fn payment_webhook(
    State(state): State<Arc<ApiState>>,
    Json(notification): Json<PaymentNotification>,
) -> Result<Json<WebhookAck>, AppError> {
    if notification.outcome == PaymentOutcome::Failure {
        // A definitive failure leaves the draft payment_pending; the
        // customer may retry until the expiry window elapses.
        tracing::warn!(
            "Payment failed at gateway: booking={}, txn={}",
            notification.booking_id, notification.txn_id
        );
        return Ok(Json(WebhookAck { status: "ignored" }));
    }

    let applied = booking_repo::mark_paid(
        &state.db_pool,
        notification.booking_id,
        &notification.txn_id,
        notification.amount,
    )
    .await;

    match applied {
        Ok(booking_repo::PaymentApplied::Applied(booking)) => {
            issue_meeting_link(&state, booking).await;
            Ok(Json(WebhookAck { status: "ok" }))
        }
        Ok(booking_repo::PaymentApplied::AlreadyPaid(_)) => {
            // Re-delivery: no side effects, no duplicate meeting issuance.
            Ok(Json(WebhookAck { status: "ok" }))
        }
        Err(err @ BookingError::Database(_)) => Err(AppError(err)),
        Err(err) => {
            // Integrity error: a retry from the gateway cannot fix this,
            // so ack it and leave the rest to manual reconciliation.
            tracing::error!(
                "Payment confirmation rejected (booking={}, txn={}, amount={}): {}",
                notification.booking_id, notification.txn_id, notification.amount, err
            );
            Ok(Json(WebhookAck { status: "ignored" }))
        }
    }
}

/// Best-effort meeting issuance after a successful payment. Failure is
/// logged for manual follow-up; the booking stays `paid`.
async fn issue_meeting_link(state: &ApiState, booking: Booking) {
    let Some(request) = build_meeting_request(&booking) else {
        tracing::error!(
            "Booking {} was paid without a bound slot; cannot schedule a meeting",
            booking.id
        );
        return;
    };

    match state.meeting_issuer.create_meeting(request).await {
        Ok(link) => {
            if let Err(e) = booking_repo::confirm_meeting(&state.db_pool, booking.id, &link).await {
                tracing::error!(
                    "Meeting link issued but could not be recorded for booking {}: {}",
                    booking.id, e
                );
            }
        }
        Err(e) => {
            tracing::error!(
                "Meeting link issuance failed for booking {}; left paid for manual follow-up: {}",
                booking.id, e
            );
        }
    }
}

/// Builds the meeting-issuer request from a paid booking. Returns `None`
/// if the booking has no bound slot.
pub fn build_meeting_request(booking: &Booking) -> Option<MeetingRequest> {
    let start = booking.start_time?;
    let end = booking.end_time?;
    let contact = booking.intake.contact();

    Some(MeetingRequest {
        title: format!(
            "Consultation with {} ({} min)",
            contact.name, booking.duration_minutes
        ),
        start,
        end,
        attendee_emails: vec![contact.email.clone()],
        attachment_urls: booking
            .intake
            .attachments()
            .iter()
            .map(|a| a.url.clone())
            .collect(),
    })
}
