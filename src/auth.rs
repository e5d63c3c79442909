//! Service-account authentication for the Sheets API.
//!
//! Each append needs a short-lived OAuth2 bearer token. The authenticator
//! signs an RS256 service-account JWT, exchanges it at the token endpoint
//! with the `jwt-bearer` grant, and caches the resulting token for a little
//! less than its lifetime so repeat submissions skip the round trip.

use crate::errors::AppError;
use crate::models::ServiceAccountKey;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use moka::future::Cache;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::time::Duration;

/// OAuth scope granting read/write access to spreadsheets.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// JWT lifetime claimed in `exp`; the authorization server controls the
/// actual token lifetime.
const JWT_LIFETIME_SECS: i64 = 3600;
/// Cache TTL kept below the claimed lifetime so an expiring token is never
/// handed out.
const TOKEN_CACHE_TTL_SECS: u64 = 55 * 60;

pub struct SheetsAuthenticator {
    client: reqwest::Client,
    token_url: String,
    key: ServiceAccountKey,
    /// Bearer tokens keyed by credential fingerprint.
    token_cache: Cache<String, String>,
    fingerprint: String,
}

impl SheetsAuthenticator {
    pub fn new(key: ServiceAccountKey, token_url: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::Unexpected(format!("Failed to create token endpoint client: {}", e))
            })?;

        let fingerprint = credential_fingerprint(&key);
        let token_cache = Cache::builder()
            .time_to_live(Duration::from_secs(TOKEN_CACHE_TTL_SECS))
            .max_capacity(16)
            .build();

        Ok(Self {
            client,
            token_url,
            key,
            token_cache,
            fingerprint,
        })
    }

    /// Returns a bearer token for the Sheets scope, reusing a cached one when
    /// it is still comfortably inside its lifetime.
    pub async fn bearer_token(&self) -> Result<String, AppError> {
        if let Some(token) = self.token_cache.get(&self.fingerprint).await {
            tracing::debug!("Reusing cached bearer token");
            return Ok(token);
        }

        let assertion = self.sign_assertion(Utc::now())?;
        let token = self.exchange(&assertion).await?;
        self.token_cache
            .insert(self.fingerprint.clone(), token.clone())
            .await;

        Ok(token)
    }

    /// Builds and signs the compact JWT: base64url(header).base64url(claims)
    /// signed with RSASSA-PKCS1-v1_5/SHA-256.
    ///
    /// The key is parsed on every call; a credential that fails to import is
    /// fatal for the request and will not become valid by retrying.
    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, AppError> {
        let iat = now.timestamp();
        let header = json!({"alg": "RS256", "typ": "JWT"});
        let claims = json!({
            "iss": self.key.client_email,
            "scope": SHEETS_SCOPE,
            "aud": self.token_url,
            "iat": iat,
            "exp": iat + JWT_LIFETIME_SECS,
        });

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).map_err(|e| {
                AppError::Unexpected(format!("Failed to serialize JWT header: {}", e))
            })?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).map_err(|e| {
                AppError::Unexpected(format!("Failed to serialize JWT claims: {}", e))
            })?),
        );

        let private_key = parse_private_key(&self.key.private_key)?;
        let digest = Sha256::digest(signing_input.as_bytes());
        let signature = private_key
            .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
            .map_err(|e| AppError::InvalidKeyMaterial(format!("RSA signing failed: {}", e)))?;

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Exchanges the signed assertion for a bearer token, form-encoded per
    /// the jwt-bearer grant.
    async fn exchange(&self, assertion: &str) -> Result<String, AppError> {
        tracing::info!("Exchanging service-account JWT at {}", self.token_url);

        let response = self
            .client
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion)])
            .send()
            .await
            .map_err(|e| AppError::transport("Token endpoint request", e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Token endpoint returned {}: {}", status, body);
            return Err(AppError::TokenEndpointError { status, body });
        }

        let payload: Value = response.json().await.map_err(|e| {
            AppError::TokenResponseMalformed(format!("Token response is not valid JSON: {}", e))
        })?;

        let token = payload
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AppError::TokenResponseMalformed(
                    "Token response missing 'access_token' field".to_string(),
                )
            })?;

        tracing::info!("Bearer token obtained");
        Ok(token.to_string())
    }
}

/// Parses the credential PEM. Google ships PKCS#8 ("BEGIN PRIVATE KEY") but
/// re-exported keys sometimes arrive as PKCS#1 ("BEGIN RSA PRIVATE KEY").
fn parse_private_key(pem: &str) -> Result<RsaPrivateKey, AppError> {
    RsaPrivateKey::from_pkcs8_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
        .map_err(|e| {
            AppError::InvalidKeyMaterial(format!("Could not import service-account key: {}", e))
        })
}

/// Stable fingerprint of a credential, used as the token cache key.
fn credential_fingerprint(key: &ServiceAccountKey) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.client_email.as_bytes());
    hasher.update(b"\n");
    hasher.update(key.private_key.as_bytes());
    hex::encode(hasher.finalize())
}
