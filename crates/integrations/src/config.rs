use std::env;
use std::time::Duration;

use eyre::{Result, WrapErr};

/// Configuration for the external payment gateway and meeting issuer.
///
/// Environment variables:
/// - `PAYMENT_GATEWAY_URL`: base URL of the gateway (required)
/// - `PAYMENT_GATEWAY_KEY`: API key sent as a bearer token (required)
/// - `MEETING_ISSUER_URL`: base URL of the meeting issuer (required)
/// - `MEETING_ISSUER_KEY`: API key for the meeting issuer (required)
/// - `INTEGRATION_TIMEOUT_SECONDS`: per-request timeout (default: 10)
#[derive(Debug, Clone)]
pub struct IntegrationsConfig {
    pub payment_gateway_url: String,
    pub payment_gateway_key: String,
    pub meeting_issuer_url: String,
    pub meeting_issuer_key: String,
    pub request_timeout: Duration,
}

impl IntegrationsConfig {
    pub fn from_env() -> Result<Self> {
        let payment_gateway_url = env::var("PAYMENT_GATEWAY_URL")
            .wrap_err("PAYMENT_GATEWAY_URL environment variable must be set")?;
        let payment_gateway_key = env::var("PAYMENT_GATEWAY_KEY")
            .wrap_err("PAYMENT_GATEWAY_KEY environment variable must be set")?;
        let meeting_issuer_url = env::var("MEETING_ISSUER_URL")
            .wrap_err("MEETING_ISSUER_URL environment variable must be set")?;
        let meeting_issuer_key = env::var("MEETING_ISSUER_KEY")
            .wrap_err("MEETING_ISSUER_KEY environment variable must be set")?;

        let request_timeout = parse_timeout(env::var("INTEGRATION_TIMEOUT_SECONDS").ok());

        Ok(Self {
            payment_gateway_url,
            payment_gateway_key,
            meeting_issuer_url,
            meeting_issuer_key,
            request_timeout,
        })
    }
}

/// Parses the timeout override, falling back to 10 seconds on anything
/// missing or unparseable.
pub fn parse_timeout(raw: Option<String>) -> Duration {
    raw.and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(10))
}
