use crate::errors::AppError;
use crate::models::{AppendResponse, AppendSummary};
use serde_json::json;
use std::time::Duration;

/// Client for the Google Sheets v4 values API.
pub struct SheetsClient {
    client: reqwest::Client,
    base_url: String,
}

impl SheetsClient {
    pub fn new(base_url: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Unexpected(format!("Failed to create Sheets client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// Appends one row to the spreadsheet.
    ///
    /// Uses `valueInputOption=USER_ENTERED` so the remote service applies its
    /// own type coercion to numeric-looking cells. Returns the update summary
    /// on success; any rejection is terminal for the request.
    pub async fn append_row(
        &self,
        bearer_token: &str,
        spreadsheet_id: &str,
        range: &str,
        row: &[String],
    ) -> Result<AppendSummary, AppError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}:append?valueInputOption=USER_ENTERED",
            self.base_url, spreadsheet_id, range
        );
        tracing::info!(
            "Appending {}-cell row to spreadsheet {} ({})",
            row.len(),
            spreadsheet_id,
            range
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", bearer_token))
            .json(&json!({ "values": [row] }))
            .send()
            .await
            .map_err(|e| AppError::transport("Sheets append request", e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Sheets append rejected with {}: {}", status, body);
            return Err(AppError::AppendRejected {
                status,
                details: rejection_details(status, body),
            });
        }

        let parsed: AppendResponse = response.json().await.map_err(|e| {
            AppError::Unexpected(format!("Failed to parse Sheets append response: {}", e))
        })?;
        let summary = parsed.updates.unwrap_or_default();

        tracing::info!(
            "Row appended: {} ({} cells)",
            summary.updated_range,
            summary.updated_cells
        );
        Ok(summary)
    }
}

/// Attaches a remediation hint for the two misconfigurations operators
/// actually hit: the sheet not shared with the signing identity, and a wrong
/// spreadsheet id.
fn rejection_details(status: u16, body: String) -> String {
    match status {
        403 => format!(
            "{} (the service account lacks edit access - share the spreadsheet with the service account email)",
            body
        ),
        404 => format!("{} (spreadsheet not found - check the spreadsheet id)", body),
        _ => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = SheetsClient::new("https://sheets.googleapis.com".to_string());
        assert!(client.is_ok());
    }

    #[test]
    fn rejection_hints_distinguish_permission_from_not_found() {
        let forbidden = rejection_details(403, "PERMISSION_DENIED".to_string());
        assert!(forbidden.contains("edit access"));

        let missing = rejection_details(404, "NOT_FOUND".to_string());
        assert!(missing.contains("check the spreadsheet id"));

        let other = rejection_details(500, "backend error".to_string());
        assert_eq!(other, "backend error");
    }
}
