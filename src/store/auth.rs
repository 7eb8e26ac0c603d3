//! OAuth2 access tokens for the Drive API.
//!
//! Tokens are obtained with the refresh-token grant and cached until shortly
//! before they expire. A static bearer token can be supplied instead for
//! local development.

use crate::error::PipelineError;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Google's OAuth2 token endpoint.
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Refresh this long before the reported expiry.
const EXPIRY_SKEW: Duration = Duration::from_secs(60);

/// OAuth2 client credentials plus a long-lived refresh token.
#[derive(Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub token_uri: String,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug)]
enum TokenSource {
    Static(String),
    Refresh(OAuthCredentials),
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at > now + EXPIRY_SKEW
    }
}

/// Access-token provider for [`super::DriveClient`].
pub struct DriveAuth {
    source: TokenSource,
    http: reqwest::Client,
    token: RwLock<Option<CachedToken>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

impl DriveAuth {
    /// Use a fixed bearer token (no refresh).
    pub fn static_token(token: impl Into<String>) -> Self {
        Self {
            source: TokenSource::Static(token.into()),
            http: reqwest::Client::new(),
            token: RwLock::new(None),
        }
    }

    /// Mint access tokens from a refresh token.
    pub fn refresh_token(credentials: OAuthCredentials, http: reqwest::Client) -> Self {
        Self {
            source: TokenSource::Refresh(credentials),
            http,
            token: RwLock::new(None),
        }
    }

    /// Get a valid access token, refreshing it if needed.
    pub async fn access_token(&self) -> Result<String, PipelineError> {
        let credentials = match &self.source {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::Refresh(c) => c,
        };

        {
            let cached = self.token.read().await;
            if let Some(t) = cached.as_ref().filter(|t| t.is_fresh(Instant::now())) {
                return Ok(t.access_token.clone());
            }
        }

        let mut slot = self.token.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(t) = slot.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(t.access_token.clone());
        }

        let fresh = self.exchange(credentials).await?;
        let token = fresh.access_token.clone();
        *slot = Some(fresh);
        Ok(token)
    }

    async fn exchange(&self, c: &OAuthCredentials) -> Result<CachedToken, PipelineError> {
        debug!("Refreshing Drive access token via {}", c.token_uri);

        let response = self
            .http
            .post(&c.token_uri)
            .form(&[
                ("client_id", c.client_id.as_str()),
                ("client_secret", c.client_secret.as_str()),
                ("refresh_token", c.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| PipelineError::Auth {
                detail: format!("token request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Auth {
                detail: format!("token exchange failed ({status}): {body}"),
            });
        }

        let parsed: TokenResponse = response.json().await.map_err(|e| PipelineError::Auth {
            detail: format!("invalid token response: {e}"),
        })?;

        Ok(CachedToken {
            access_token: parsed.access_token,
            expires_at: Instant::now() + Duration::from_secs(parsed.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_token_is_returned_as_is() {
        let auth = DriveAuth::static_token("ya29.abc");
        let token = tokio_test::block_on(auth.access_token()).unwrap();
        assert_eq!(token, "ya29.abc");
    }

    #[test]
    fn token_close_to_expiry_is_stale() {
        let now = Instant::now();
        let t = CachedToken {
            access_token: "t".into(),
            expires_at: now + Duration::from_secs(30),
        };
        assert!(!t.is_fresh(now));

        let t = CachedToken {
            access_token: "t".into(),
            expires_at: now + Duration::from_secs(600),
        };
        assert!(t.is_fresh(now));
    }

    #[test]
    fn credentials_debug_redacts_secrets() {
        let c = OAuthCredentials {
            client_id: "id".into(),
            client_secret: "shh".into(),
            refresh_token: "1//refresh".into(),
            token_uri: GOOGLE_TOKEN_URI.into(),
        };
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("shh"));
        assert!(!dbg.contains("1//refresh"));
    }

    #[test]
    fn token_response_defaults_expiry() {
        let r: TokenResponse = serde_json::from_str(r#"{"access_token":"a"}"#).unwrap();
        assert_eq!(r.expires_in, 3600);
    }
}
