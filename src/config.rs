use crate::models::ServiceAccountKey;

/// Google OAuth2 token endpoint used for the jwt-bearer grant.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Base URL of the Google Sheets v4 API.
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Target spreadsheet. Submissions are rejected with `ConfigurationMissing`
    /// until this is set.
    pub spreadsheet_id: Option<String>,
    /// A1-notation range covering the lead columns.
    pub sheet_range: String,
    /// Service-account credential used to mint bearer tokens. Submissions are
    /// rejected with `ConfigurationMissing` until this is set.
    pub service_account: Option<ServiceAccountKey>,
    pub token_url: String,
    pub sheets_base_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            spreadsheet_id: std::env::var("SHEETS_SPREADSHEET_ID")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            sheet_range: std::env::var("SHEETS_RANGE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "Sheet1!A:V".to_string()),
            service_account: load_service_account()?,
            token_url: std::env::var("GOOGLE_TOKEN_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("GOOGLE_TOKEN_URL must start with http:// or https://");
                    }
                    Ok(url)
                })
                .transpose()?
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            sheets_base_url: std::env::var("SHEETS_API_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("SHEETS_API_BASE_URL must start with http:// or https://");
                    }
                    Ok(url)
                })
                .transpose()?
                .unwrap_or_else(|| DEFAULT_SHEETS_BASE_URL.to_string()),
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        match &config.spreadsheet_id {
            Some(id) => tracing::debug!("Spreadsheet ID: {}...", &id[..8.min(id.len())]),
            None => tracing::warn!(
                "SHEETS_SPREADSHEET_ID not set - lead submissions will be rejected until configured"
            ),
        }
        match &config.service_account {
            Some(key) => tracing::debug!("Service account: {}", key.client_email),
            None => tracing::warn!(
                "Service account credential not set - lead submissions will be rejected until configured"
            ),
        }
        tracing::debug!("Token endpoint: {}", config.token_url);
        tracing::debug!("Sheets API: {}", config.sheets_base_url);
        tracing::debug!("Sheet range: {}", config.sheet_range);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

/// Loads the service-account credential from the environment.
///
/// Accepts either the full credential JSON in `GOOGLE_SERVICE_ACCOUNT_JSON`
/// (the file Google hands out, extra fields ignored) or the pair
/// `GOOGLE_CLIENT_EMAIL` / `GOOGLE_PRIVATE_KEY`. Private keys that travelled
/// through an env file usually carry literal `\n` sequences; those are
/// normalized back to newlines.
fn load_service_account() -> anyhow::Result<Option<ServiceAccountKey>> {
    if let Ok(raw) = std::env::var("GOOGLE_SERVICE_ACCOUNT_JSON") {
        if !raw.trim().is_empty() {
            let mut key: ServiceAccountKey = serde_json::from_str(&raw).map_err(|e| {
                anyhow::anyhow!(
                    "GOOGLE_SERVICE_ACCOUNT_JSON is not valid credential JSON: {}",
                    e
                )
            })?;
            if key.client_email.trim().is_empty() || key.private_key.trim().is_empty() {
                anyhow::bail!(
                    "GOOGLE_SERVICE_ACCOUNT_JSON must contain client_email and private_key"
                );
            }
            key.private_key = key.private_key.replace("\\n", "\n");
            return Ok(Some(key));
        }
    }

    let email = std::env::var("GOOGLE_CLIENT_EMAIL")
        .ok()
        .filter(|s| !s.trim().is_empty());
    let private_key = std::env::var("GOOGLE_PRIVATE_KEY")
        .ok()
        .filter(|s| !s.trim().is_empty());

    match (email, private_key) {
        (Some(client_email), Some(private_key)) => Ok(Some(ServiceAccountKey {
            client_email,
            private_key: private_key.replace("\\n", "\n"),
        })),
        (None, None) => Ok(None),
        _ => anyhow::bail!("GOOGLE_CLIENT_EMAIL and GOOGLE_PRIVATE_KEY must be set together"),
    }
}
