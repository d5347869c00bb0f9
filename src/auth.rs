//! Access token providers.
//!
//! The client asks a [`TokenProvider`] for a bearer token before every
//! authenticated request and does not care how the token is obtained.

use async_trait::async_trait;
use log::debug;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::DEFAULT_AUTH_HOST;
use crate::error::{LfError, Result};
use crate::http::HttpClient;

/// Tokens are refreshed this long before the server says they expire.
const EXPIRY_BUFFER: Duration = Duration::from_secs(60);

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// A pre-issued token that never changes.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: u64,
}

struct CachedToken {
    token: String,
    /// `None` when the lifetime is too far out to represent.
    expires_at: Option<Instant>,
}

/// OAuth2 client-credentials flow against the ListenFirst auth host.
///
/// The token is cached and reused until one minute before it expires.
pub struct ClientCredentials {
    http_client: HttpClient,
    client_id: String,
    client_secret: String,
    auth_host: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientCredentials {
    pub fn new(
        http_client: HttpClient,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        auth_host: Option<&str>,
    ) -> Self {
        Self {
            http_client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_host: auth_host.unwrap_or(DEFAULT_AUTH_HOST).trim_end_matches('/').to_string(),
            cached: Mutex::new(None),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_access_token(&self) -> Result<CachedToken> {
        let url = format!("{}/oauth2/token", self.auth_host);
        debug!("Requesting access token from {}...", url);

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "client_credentials"),
            ("scope", "api/basic"),
        ];

        let response = self
            .http_client
            .inner()
            .request(Method::POST, &url)
            .headers(headers)
            .form(&form)
            .send()
            .await
            .map_err(|e| LfError::Auth(format!("Failed to obtain access token: {}", e)))?;

        let response = crate::http::check_status(Method::POST, response)
            .await
            .map_err(|e| LfError::Auth(format!("Failed to obtain access token: {}", e)))?;

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|_| LfError::Auth("Invalid token response".to_string()))?;

        let token = body
            .access_token
            .ok_or_else(|| LfError::Auth("Invalid token response".to_string()))?;

        Ok(CachedToken {
            token,
            expires_at: Instant::now().checked_add(Duration::from_secs(body.expires_in)),
        })
    }
}

#[async_trait]
impl TokenProvider for ClientCredentials {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(entry) = cached.as_ref() {
            if entry
                .expires_at
                .is_none_or(|expires_at| expires_at > Instant::now() + EXPIRY_BUFFER)
            {
                return Ok(entry.token.clone());
            }
            debug!("Access token expires soon, refreshing");
        }

        let fresh = self.fetch_access_token().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}
