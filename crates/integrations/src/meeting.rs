use async_trait::async_trait;
use eyre::{Result, WrapErr, eyre};
use serde::Deserialize;

use crate::config::IntegrationsConfig;
use crate::{MeetingIssuer, MeetingRequest};

#[derive(Debug, Deserialize)]
struct CreateMeetingResponse {
    meeting_link: String,
}

/// Meeting issuer client. Issuance is best-effort: callers log failures
/// for manual follow-up and never revert payment state.
pub struct HttpMeetingIssuer {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl HttpMeetingIssuer {
    pub fn new(config: &IntegrationsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .wrap_err("Failed to build meeting issuer HTTP client")?;

        Ok(Self {
            base_url: config.meeting_issuer_url.trim_end_matches('/').to_string(),
            api_key: config.meeting_issuer_key.clone(),
            http,
        })
    }
}

#[async_trait]
impl MeetingIssuer for HttpMeetingIssuer {
    async fn create_meeting(&self, request: MeetingRequest) -> Result<String> {
        let url = format!("{}/v1/meetings", self.base_url);
        tracing::debug!("Creating meeting: title={}", request.title);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .wrap_err("Meeting issuer request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(eyre!("Meeting issuer returned {}: {}", status, body));
        }

        let parsed: CreateMeetingResponse = response
            .json()
            .await
            .wrap_err("Meeting issuer returned an unreadable response")?;
        Ok(parsed.meeting_link)
    }
}
