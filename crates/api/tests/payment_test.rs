use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use slotwise_api::handlers::payment::build_meeting_request;
use slotwise_core::models::booking::{Booking, BookingStatus};
use slotwise_core::models::intake::{AttachmentRef, ContactInfo, IntakePayload};
use slotwise_integrations::{MeetingIssuer, MockMeetingIssuer, MockPaymentGateway, PaymentGateway};
use uuid::Uuid;

fn paid_booking() -> Booking {
    let start = Utc::now() + Duration::days(2);
    Booking {
        id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        expert_id: Uuid::new_v4(),
        start_time: Some(start),
        end_time: Some(start + Duration::minutes(45)),
        duration_minutes: 45,
        timezone: "Asia/Kolkata".to_string(),
        price: 2000,
        status: BookingStatus::Paid,
        payment_txn_id: Some("pay_51".to_string()),
        paid_at: Some(Utc::now()),
        meeting_link: None,
        meeting_link_created_at: None,
        cancelled_by: None,
        cancelled_at: None,
        refund_amount: None,
        expires_at: None,
        intake: IntakePayload::Dermatology {
            contact: ContactInfo {
                name: "Asha Rao".to_string(),
                email: "asha@example.com".to_string(),
                phone: None,
            },
            skin_type: "dry".to_string(),
            concerns: vec!["rosacea".to_string()],
            current_routine: None,
            attachments: vec![AttachmentRef {
                file_name: "cheek.jpg".to_string(),
                url: "https://cdn.example.com/cheek.jpg".to_string(),
            }],
        },
        created_at: Utc::now(),
    }
}

#[test]
fn test_meeting_request_carries_schedule_and_intake() {
    let booking = paid_booking();
    let request = build_meeting_request(&booking).expect("paid booking has a slot");

    assert_eq!(request.start, booking.start_time.unwrap());
    assert_eq!(request.end, booking.end_time.unwrap());
    assert_eq!(request.attendee_emails, vec!["asha@example.com"]);
    assert_eq!(
        request.attachment_urls,
        vec!["https://cdn.example.com/cheek.jpg"]
    );
    assert!(request.title.contains("45 min"));
}

#[test]
fn test_meeting_request_requires_a_bound_slot() {
    let mut booking = paid_booking();
    booking.start_time = None;
    booking.end_time = None;

    assert!(build_meeting_request(&booking).is_none());
}

#[tokio::test]
async fn test_gateway_trait_object_passes_redirect_through() {
    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_authorize()
        .returning(|_, _, _| Ok("https://pay.example.com/redirect/1".to_string()));

    let gateway: std::sync::Arc<dyn PaymentGateway> = std::sync::Arc::new(gateway);
    let url = gateway
        .authorize(Uuid::new_v4(), 2000, "asha@example.com")
        .await
        .unwrap();
    assert_eq!(url, "https://pay.example.com/redirect/1");
}

#[tokio::test]
async fn test_meeting_issuer_trait_object() {
    let booking = paid_booking();
    let request = build_meeting_request(&booking).unwrap();

    let mut issuer = MockMeetingIssuer::new();
    issuer
        .expect_create_meeting()
        .returning(|_| Ok("https://meet.example.com/xyz".to_string()));

    let issuer: std::sync::Arc<dyn MeetingIssuer> = std::sync::Arc::new(issuer);
    let link = issuer.create_meeting(request).await.unwrap();
    assert_eq!(link, "https://meet.example.com/xyz");
}
