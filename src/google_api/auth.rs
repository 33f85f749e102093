//! Credential resolution and OAuth2 access tokens for Google APIs.
//!
//! Two credential types are accepted, distinguished by their `"type"` field:
//! - `service_account`: a signed JWT is exchanged for an access token
//!   (RFC 7523 jwt-bearer grant).
//! - `authorized_user`: a stored refresh token is exchanged for an access
//!   token (refresh_token grant).
//!
//! Credentials come from the inline input first, then from the file named by
//! `GOOGLE_APPLICATION_CREDENTIALS`.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use super::{GoogleApiError, SCOPES};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for service account assertions (Google's maximum).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

// ============================================================================
// Credential types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GoogleCredentials {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUserCredentials),
}

/// Service account key file as downloaded from Google Cloud.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

/// `gcloud auth application-default login` output.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUserCredentials {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// A bearer token for the Calendar and Tasks APIs.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve credentials from the inline input or a key file path.
///
/// Resolution order:
/// 1. `inline` JSON, when non-empty
/// 2. the file at `key_file` (normally `GOOGLE_APPLICATION_CREDENTIALS`)
/// 3. otherwise `NoCredentials`
pub fn resolve_credentials(
    inline: Option<&str>,
    key_file: Option<&Path>,
) -> Result<GoogleCredentials, GoogleApiError> {
    if let Some(json) = inline.filter(|s| !s.trim().is_empty()) {
        log::debug!("Using credentials from input parameter");
        return serde_json::from_str(json).map_err(|e| {
            GoogleApiError::InvalidCredentials(format!("Failed to parse credentials JSON: {}", e))
        });
    }

    if let Some(path) = key_file {
        log::debug!(
            "Using credentials from GOOGLE_APPLICATION_CREDENTIALS: {}",
            path.display()
        );
        if !path.exists() {
            return Err(GoogleApiError::CredentialsNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        return serde_json::from_str(&content).map_err(|e| {
            GoogleApiError::InvalidCredentials(format!("{}: {}", path.display(), e))
        });
    }

    Err(GoogleApiError::NoCredentials)
}

// ============================================================================
// Token exchange
// ============================================================================

/// Exchange credentials for an access token scoped to Calendar and Tasks.
pub async fn fetch_access_token(
    client: &reqwest::Client,
    credentials: &GoogleCredentials,
) -> Result<AccessToken, GoogleApiError> {
    let (token_uri, status, body_text) = match credentials {
        GoogleCredentials::ServiceAccount(key) => {
            let assertion = sign_assertion(key, Utc::now())?;
            let form = [
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ];
            let resp = client.post(&key.token_uri).form(&form).send().await?;
            let status = resp.status();
            (key.token_uri.as_str(), status, resp.text().await.unwrap_or_default())
        }
        GoogleCredentials::AuthorizedUser(user) => {
            let mut form = vec![
                ("client_id", user.client_id.as_str()),
                ("refresh_token", user.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ];
            if let Some(secret) = user.client_secret.as_deref() {
                form.push(("client_secret", secret));
            }
            let resp = client.post(&user.token_uri).form(&form).send().await?;
            let status = resp.status();
            (user.token_uri.as_str(), status, resp.text().await.unwrap_or_default())
        }
    };

    if !status.is_success() {
        return Err(map_token_error(status.as_u16(), &body_text));
    }

    let body: serde_json::Value = serde_json::from_str(&body_text)?;
    let access_token = body["access_token"].as_str().ok_or_else(|| {
        GoogleApiError::RefreshFailed(format!("No access_token in response from {}", token_uri))
    })?;
    let expires_in = body["expires_in"].as_i64().unwrap_or(ASSERTION_LIFETIME_SECS);

    Ok(AccessToken {
        token: access_token.to_string(),
        expires_at: Utc::now() + Duration::seconds(expires_in),
    })
}

/// Build the RS256-signed assertion for the jwt-bearer grant.
fn sign_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String, GoogleApiError> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let iat = now.timestamp();
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: SCOPES.join(" "),
        aud: &key.token_uri,
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(jsonwebtoken::encode(&header, &claims, &encoding_key)?)
}

fn map_token_error(status: u16, body: &str) -> GoogleApiError {
    let lowered = body.to_lowercase();
    if (status == 400 || status == 401)
        && (lowered.contains("invalid_grant") || lowered.contains("token has been expired"))
    {
        return GoogleApiError::AuthExpired;
    }
    GoogleApiError::RefreshFailed(format!("HTTP {}: {}", status, body))
}
