//! Authenticator implementation
//!
//! Handles applying authentication to requests and managing the session
//! token obtained at login.

use super::types::{AuthConfig, CachedToken};
use crate::error::{Error, Result};
use crate::types::StringMap;
use chrono::Utc;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Authenticator handles applying authentication to HTTP requests
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Cached token for session auth
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// HTTP client for login requests
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create an authenticator with a custom HTTP client
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        match &self.config {
            AuthConfig::None => Ok(req),

            AuthConfig::Basic { username, password } => {
                Ok(req.basic_auth(username, Some(password)))
            }

            AuthConfig::Bearer { token } => Ok(req.bearer_auth(token)),

            AuthConfig::Session {
                token_header,
                token_prefix,
                ..
            } => {
                let token = self.get_or_login().await?;
                let value = format!("{}{}", token_prefix.as_deref().unwrap_or(""), token);
                Ok(req.header(token_header.as_str(), value))
            }
        }
    }

    /// Log in eagerly so that bad credentials fail before any export work.
    ///
    /// A no-op for auth types without a login step.
    pub async fn login(&self) -> Result<()> {
        if matches!(self.config, AuthConfig::Session { .. }) {
            self.get_or_login().await?;
        }
        Ok(())
    }

    /// Get a valid token, logging in again if necessary
    async fn get_or_login(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have logged in while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let new_token = self.fetch_session_token().await?;
        let token_str = new_token.token.clone();
        *cached = Some(new_token);

        Ok(token_str)
    }

    /// Fetch a session token by logging in
    async fn fetch_session_token(&self) -> Result<CachedToken> {
        let AuthConfig::Session {
            login_url,
            login_body,
            token_path,
            expires_in_path,
            ..
        } = &self.config
        else {
            return Err(Error::auth("Login not supported for this auth type"));
        };

        debug!("Logging in at {}", login_url);
        let body = self.post_login(login_url, login_body).await?;

        let token = extract_jsonpath(&body, token_path).ok_or_else(|| {
            Error::auth(format!("Could not extract token from path: {token_path}"))
        })?;

        let expires_at = expires_in_path
            .as_deref()
            .and_then(|path| extract_jsonpath(&body, path))
            .and_then(|v| v.parse::<i64>().ok())
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));

        Ok(CachedToken::new(token, expires_at))
    }

    async fn post_login(&self, login_url: &str, login_body: &StringMap) -> Result<Value> {
        let response = self
            .http_client
            .post(login_url)
            .json(login_body)
            .send()
            .await
            .map_err(|e| Error::auth(format!("Login request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::auth(format!(
                "Login request failed with status {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::auth(format!("Login response is not JSON: {e}")))
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("kind", &self.config.kind())
            .finish_non_exhaustive()
    }
}

/// Extract a value from JSON using a simple JSONPath expression
/// Supports basic paths like "$.data.token" or "data.token"
pub fn extract_jsonpath(value: &Value, path: &str) -> Option<String> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    match current {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
