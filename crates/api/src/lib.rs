//! # Slotwise API
//!
//! The API crate provides the web server for the Slotwise booking engine.
//! It exposes availability queries, the draft/claim/cancel booking
//! commands, and the payment-gateway webhook.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Error mapping from the domain taxonomy to HTTP
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework and SQLx for database
//! interactions; external collaborators (payment gateway, meeting issuer)
//! are reached through the trait objects carried in [`ApiState`].

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::Router;
use chrono::Duration;
use eyre::Result;
use slotwise_integrations::{MeetingIssuer, PaymentGateway};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers.
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Payment-authorization client; only ever called outside transactions
    pub payment_gateway: Arc<dyn PaymentGateway>,
    /// Best-effort meeting-link issuer
    pub meeting_issuer: Arc<dyn MeetingIssuer>,
    /// How long a draft holds before the reaper may remove it
    pub draft_expiry: Duration,
    /// Forward horizon of availability queries, in civil days
    pub horizon_days: u32,
}

/// Starts the API server with the provided configuration, database
/// connection and external-service clients.
pub async fn start_server(
    config: config::ApiConfig,
    db_pool: PgPool,
    payment_gateway: Arc<dyn PaymentGateway>,
    meeting_issuer: Arc<dyn MeetingIssuer>,
) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create shared state with dependencies
    let state = Arc::new(ApiState {
        db_pool,
        payment_gateway,
        meeting_issuer,
        draft_expiry: Duration::minutes(config.draft_expiry_minutes),
        horizon_days: config.horizon_days,
    });

    // Build the application router with all routes
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Availability queries
        .merge(routes::availability::routes())
        // Booking lifecycle commands
        .merge(routes::booking::routes())
        // Payment gateway webhook
        .merge(routes::webhook::routes())
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(
                origins
                    .iter()
                    .filter_map(|origin| origin.parse().ok())
                    .collect::<Vec<_>>(),
            );
        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(tower_http::timeout::TimeoutLayer::new(
        std::time::Duration::from_secs(config.request_timeout),
    ));

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
