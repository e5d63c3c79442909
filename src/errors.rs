use axum::{
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::fmt;

use crate::handlers::CORS_HEADERS;

/// Application-specific error types.
///
/// Every variant maps to the same 500 JSON envelope on the wire; the variant
/// name is the machine-readable `error` category the calling UI logs.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Spreadsheet id or service-account credential not configured.
    ConfigurationMissing(String),
    /// Request body is not a well-formed lead submission.
    MalformedPayload(String),
    /// The service-account private key could not be decoded or imported.
    InvalidKeyMaterial(String),
    /// The OAuth token endpoint answered non-2xx.
    TokenEndpointError { status: u16, body: String },
    /// The token endpoint answered 2xx but without an access token.
    TokenResponseMalformed(String),
    /// The Sheets append call was rejected.
    AppendRejected { status: u16, details: String },
    /// An outbound call exceeded its deadline.
    NetworkTimeout(String),
    /// Catch-all for anything else.
    Unexpected(String),
}

impl AppError {
    /// Machine-readable category carried in the `error` field of the
    /// failure envelope.
    pub fn category(&self) -> &'static str {
        match self {
            AppError::ConfigurationMissing(_) => "ConfigurationMissing",
            AppError::MalformedPayload(_) => "MalformedPayload",
            AppError::InvalidKeyMaterial(_) => "InvalidKeyMaterial",
            AppError::TokenEndpointError { .. } => "TokenEndpointError",
            AppError::TokenResponseMalformed(_) => "TokenResponseMalformed",
            AppError::AppendRejected { .. } => "AppendRejected",
            AppError::NetworkTimeout(_) => "NetworkTimeout",
            AppError::Unexpected(_) => "UnexpectedFailure",
        }
    }

    /// Human-readable detail string for the failure envelope.
    pub fn details(&self) -> String {
        match self {
            AppError::ConfigurationMissing(msg)
            | AppError::MalformedPayload(msg)
            | AppError::InvalidKeyMaterial(msg)
            | AppError::TokenResponseMalformed(msg)
            | AppError::NetworkTimeout(msg)
            | AppError::Unexpected(msg) => msg.clone(),
            AppError::TokenEndpointError { status, body } => {
                format!("Token endpoint returned {}: {}", status, body)
            }
            AppError::AppendRejected { status, details } => {
                format!("Sheets API returned {}: {}", status, details)
            }
        }
    }

    /// Classifies a reqwest transport failure, keeping timeouts as their own
    /// category so callers can tell a slow upstream from a definitive refusal.
    pub fn transport(what: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::NetworkTimeout(format!("{} timed out: {}", what, err))
        } else {
            AppError::Unexpected(format!("{} failed: {}", what, err))
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category(), self.details())
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into the failure envelope.
    ///
    /// All failures are reported as HTTP 500 with
    /// `{success: false, error, details, timestamp}`; the calling UI only
    /// distinguishes success from failure and never surfaces upstream
    /// credential details to the end user.
    fn into_response(self) -> Response {
        match &self {
            AppError::MalformedPayload(msg) => {
                tracing::warn!("Malformed payload: {}", msg);
            }
            AppError::ConfigurationMissing(msg) => {
                tracing::error!("Configuration missing: {}", msg);
            }
            other => {
                tracing::error!("{}", other);
            }
        }

        let body = Json(json!({
            "success": false,
            "error": self.category(),
            "details": self.details(),
            "timestamp": Utc::now().to_rfc3339(),
        }));

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            AppendHeaders(CORS_HEADERS),
            body,
        )
            .into_response()
    }
}
