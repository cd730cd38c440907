use async_trait::async_trait;
use eyre::{Result, WrapErr, eyre};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::PaymentGateway;
use crate::config::IntegrationsConfig;

#[derive(Debug, Serialize)]
struct AuthorizeRequest<'a> {
    booking_id: Uuid,
    amount: i64,
    currency: &'static str,
    payer_email: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthorizeResponse {
    redirect_url: String,
}

/// Gateway client with a bounded timeout. A timeout or transport error is
/// an unknown outcome: the caller leaves the booking `payment_pending` and
/// waits for the webhook or the expiry window.
pub struct HttpPaymentGateway {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl HttpPaymentGateway {
    pub fn new(config: &IntegrationsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .wrap_err("Failed to build payment gateway HTTP client")?;

        Ok(Self {
            base_url: config.payment_gateway_url.trim_end_matches('/').to_string(),
            api_key: config.payment_gateway_key.clone(),
            http,
        })
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn authorize(
        &self,
        booking_id: Uuid,
        amount: i64,
        payer_email: &str,
    ) -> Result<String> {
        let url = format!("{}/v1/authorize", self.base_url);
        tracing::debug!("Requesting payment authorization: booking={}", booking_id);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&AuthorizeRequest {
                booking_id,
                amount,
                currency: "INR",
                payer_email,
            })
            .send()
            .await
            .wrap_err("Payment gateway request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(eyre!(
                "Payment gateway returned {} for booking {}: {}",
                status,
                booking_id,
                body
            ));
        }

        let parsed: AuthorizeResponse = response
            .json()
            .await
            .wrap_err("Payment gateway returned an unreadable response")?;
        Ok(parsed.redirect_url)
    }
}
