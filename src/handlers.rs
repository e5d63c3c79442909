use crate::auth::SheetsAuthenticator;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{LeadSubmission, SaveResponse};
use crate::row;
use crate::sheets::SheetsClient;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{AppendHeaders, IntoResponse},
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

/// CORS headers attached to every response, matching what the lookup page
/// expects.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET, POST, PUT, DELETE, OPTIONS"),
    (
        "access-control-allow-headers",
        "Content-Type, Authorization, X-Client-Info, Apikey",
    ),
];

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Authenticator minting bearer tokens; absent until a service-account
    /// credential is configured.
    pub authenticator: Option<SheetsAuthenticator>,
    /// Client for the Sheets values API.
    pub sheets: SheetsClient,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "lead-sheets-api",
            "version": "0.1.0"
        })),
    )
}

/// CORS preflight short-circuit: empty 200 with the CORS headers, before any
/// config validation or outbound call.
pub async fn preflight() -> impl IntoResponse {
    (StatusCode::OK, AppendHeaders(CORS_HEADERS))
}

/// POST /api/v1/leads
///
/// Flow:
/// 1. Validate configuration (spreadsheet id + credential present).
/// 2. Reject payloads without a phone number (the one mandatory field).
/// 3. Format the fixed-order row.
/// 4. Obtain a bearer token (signed JWT -> token exchange, possibly cached).
/// 5. Append the row.
/// 6. Respond with the update summary envelope.
///
/// Every failure branches straight to the error envelope; a token minted for
/// an append that then fails is simply discarded.
pub async fn save_lead(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LeadSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    // Step 2 of the state machine happens first on the extractor: a body that
    // is not a well-formed lead mapping never reaches the flow below.
    let Json(lead) = payload
        .map_err(|rejection| AppError::MalformedPayload(rejection.body_text()))?;

    tracing::info!(
        "Received lead submission: lookup_type={:?}, part={:?}",
        lead.lookup_type,
        lead.part_name
    );

    // Step 1: validate configuration before any crypto or network work
    let spreadsheet_id = state.config.spreadsheet_id.as_deref().ok_or_else(|| {
        AppError::ConfigurationMissing("SHEETS_SPREADSHEET_ID is not configured".to_string())
    })?;
    let authenticator = state.authenticator.as_ref().ok_or_else(|| {
        AppError::ConfigurationMissing(
            "Service-account credential is not configured".to_string(),
        )
    })?;

    // Step 2: presence check only - no further validation by design
    if lead
        .mobile_number
        .as_deref()
        .map_or(true, |n| n.trim().is_empty())
    {
        return Err(AppError::MalformedPayload(
            "mobileNumber is required".to_string(),
        ));
    }

    // Step 3: build the row
    let row = row::format_row(&lead);

    // Steps 4-5: sign, exchange, append
    let token = authenticator.bearer_token().await?;
    let summary = state
        .sheets
        .append_row(&token, spreadsheet_id, &state.config.sheet_range, &row)
        .await?;

    tracing::info!(
        "Lead saved to {} ({} rows, {} cells)",
        summary.updated_range,
        summary.updated_rows,
        summary.updated_cells
    );

    // Step 6: success envelope
    Ok((
        StatusCode::OK,
        AppendHeaders(CORS_HEADERS),
        Json(SaveResponse {
            success: true,
            message: "Lead saved to spreadsheet".to_string(),
            result: summary,
            timestamp: Utc::now().to_rfc3339(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn preflight_returns_200_with_cors_headers() {
        let response = preflight().await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
        assert_eq!(
            headers.get("access-control-allow-methods").unwrap(),
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            headers.get("access-control-allow-headers").unwrap(),
            "Content-Type, Authorization, X-Client-Info, Apikey"
        );
    }

    #[tokio::test]
    async fn health_reports_service_name() {
        let (status, Json(body)) = health().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "lead-sheets-api");
    }
}
