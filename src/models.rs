use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// A lead submitted from the vehicle-lookup page.
///
/// `vehicle_data` is deliberately loose: depending on which lookup the user
/// ran it carries a decoded-VIN record (`vehicle`), a free-form record
/// (`vehicleInfo`), a plate-lookup record (`plate`), a history record
/// (`history`), or the vehicle fields directly at the top level.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    #[serde(default)]
    pub vehicle_data: Value,
    pub name: Option<String>,
    /// Mandatory; presence is checked by the request handler.
    pub mobile_number: Option<String>,
    pub email: Option<String>,
    pub part_name: Option<String>,
    pub lookup_type: Option<String>,
}

/// Service-account credential: issuer email plus RSA private key in PEM form.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
}

impl fmt::Debug for ServiceAccountKey {
    /// Keeps the private key out of debug output and logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Update summary returned by the Sheets append call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendSummary {
    #[serde(default)]
    pub updated_range: String,
    #[serde(default)]
    pub updated_rows: u32,
    #[serde(default)]
    pub updated_columns: u32,
    #[serde(default)]
    pub updated_cells: u32,
}

/// Raw shape of the Sheets `values:append` response. The summary lives under
/// `updates`; everything else is tolerated and ignored.
#[derive(Debug, Deserialize)]
pub struct AppendResponse {
    #[serde(default)]
    pub updates: Option<AppendSummary>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Success envelope returned to the calling UI.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
    pub result: AppendSummary,
    pub timestamp: String,
}
