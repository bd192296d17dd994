//! OAuth access tokens for the Sheets API.

use std::path::Path;
use std::time::{Duration, Instant};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::error::StoreError;

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3_600;
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Fields of a Google service-account key file used for token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    String::from("https://oauth2.googleapis.com/token")
}

impl ServiceAccountKey {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&raw).map_err(|e| {
            StoreError::Auth(format!(
                "invalid service account key '{}': {e}",
                path.as_ref().display()
            ))
        })
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

/// Access token held until shortly before it expires.
#[derive(Debug, Clone)]
pub struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Credential used to authorize Sheets requests.
#[derive(Debug)]
pub enum SheetsAuth {
    /// Pre-issued OAuth access token.
    AccessToken(String),
    /// Service account exchanging a signed JWT for short-lived tokens.
    ServiceAccount {
        key: ServiceAccountKey,
        cached: Mutex<Option<CachedToken>>,
    },
}

impl SheetsAuth {
    pub fn service_account(key: ServiceAccountKey) -> Self {
        Self::ServiceAccount {
            key,
            cached: Mutex::new(None),
        }
    }

    /// Returns a bearer token, refreshing a cached service-account token close to expiry.
    pub async fn bearer_token(&self, client: &reqwest::Client) -> Result<String, StoreError> {
        match self {
            Self::AccessToken(token) => Ok(token.clone()),
            Self::ServiceAccount { key, cached } => {
                let mut guard = cached.lock().await;
                if let Some(token) = guard.as_ref() {
                    if Instant::now() + REFRESH_MARGIN < token.expires_at {
                        return Ok(token.value.clone());
                    }
                }

                let fresh = exchange_assertion(client, key).await?;
                let value = fresh.value.clone();
                *guard = Some(fresh);
                Ok(value)
            }
        }
    }
}

fn sign_assertion(key: &ServiceAccountKey) -> Result<String, StoreError> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: SHEETS_SCOPE,
        aud: &key.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };
    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| StoreError::Auth(format!("unreadable private key: {e}")))?;

    encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
        .map_err(|e| StoreError::Auth(format!("failed to sign assertion: {e}")))
}

async fn exchange_assertion(
    client: &reqwest::Client,
    key: &ServiceAccountKey,
) -> Result<CachedToken, StoreError> {
    let assertion = sign_assertion(key)?;
    tracing::debug!(account = %key.client_email, "requesting sheets access token");

    let response = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await
        .map_err(|e| StoreError::Auth(format!("token request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StoreError::Auth(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| StoreError::Auth(format!("malformed token response: {e}")))?;

    Ok(CachedToken {
        value: token.access_token,
        expires_at: Instant::now() + Duration::from_secs(token.expires_in),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_is_returned_as_is() {
        let auth = SheetsAuth::AccessToken(String::from("ya29.token"));
        let token = auth
            .bearer_token(&reqwest::Client::new())
            .await
            .expect("static token");
        assert_eq!(token, "ya29.token");
    }

    #[test]
    fn key_file_without_token_uri_uses_google_default() {
        let key: ServiceAccountKey = serde_json::from_str(
            r#"{"client_email":"svc@project.iam.gserviceaccount.com","private_key":"---"}"#,
        )
        .expect("key json");
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn garbage_private_key_is_an_auth_error() {
        let key = ServiceAccountKey {
            client_email: String::from("svc@example.test"),
            private_key: String::from("not a pem"),
            token_uri: default_token_uri(),
        };
        assert!(matches!(sign_assertion(&key), Err(StoreError::Auth(_))));
    }
}
