use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lead_sheets_api::auth::SheetsAuthenticator;
use lead_sheets_api::config::Config;
use lead_sheets_api::handlers::{self, AppState};
use lead_sheets_api::sheets::SheetsClient;

/// Main entry point for the application.
///
/// Initializes logging, loads configuration, wires up the authenticator and
/// Sheets client, and starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_sheets_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Authenticator is only built once a credential is configured; until
    // then submissions fail with ConfigurationMissing.
    let authenticator = match &config.service_account {
        Some(key) => {
            let auth = SheetsAuthenticator::new(key.clone(), config.token_url.clone())
                .map_err(|e| anyhow::anyhow!("Failed to initialize authenticator: {}", e))?;
            tracing::info!("Service-account authenticator initialized");
            Some(auth)
        }
        None => None,
    };

    let sheets = SheetsClient::new(config.sheets_base_url.clone())
        .map_err(|e| anyhow::anyhow!("Failed to initialize Sheets client: {}", e))?;

    // Build application state
    let app_state = Arc::new(AppState {
        config: config.clone(),
        authenticator,
        sheets,
    });

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/v1/leads",
            post(handlers::save_lead).options(handlers::preflight),
        )
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // Request size limit: 1MB max payload (lead payloads are tiny)
                .layer(RequestBodyLimitLayer::new(1024 * 1024)),
        );

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
