//! Auth configuration types

use crate::types::StringMap;
use chrono::{DateTime, Utc};

/// Login endpoint, relative to the server URL
pub const DEFAULT_LOGIN_PATH: &str = "/nl/jsp/logon.jsp";

/// Path of the session token in the login response
pub const DEFAULT_TOKEN_PATH: &str = "$.sessionToken";

/// Header carrying the session token on every call
pub const DEFAULT_TOKEN_HEADER: &str = "X-Session-Token";

/// Authentication configuration
#[derive(Debug, Clone, Default)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// HTTP Basic authentication
    Basic {
        /// Username
        username: String,
        /// Password
        password: String,
    },

    /// Bearer token authentication
    Bearer {
        /// The bearer token
        token: String,
    },

    /// Session-based authentication (login endpoint)
    Session {
        /// Login endpoint URL
        login_url: String,
        /// Login request body (sent as JSON)
        login_body: StringMap,
        /// JSONPath to extract token from response
        token_path: String,
        /// Header name to use for the token
        token_header: String,
        /// Prefix for token value (e.g., "Bearer ")
        token_prefix: Option<String>,
        /// JSONPath to extract expiration time (seconds)
        expires_in_path: Option<String>,
    },
}

impl AuthConfig {
    /// Session login with a user name and password against `login_url`,
    /// using the default token location and header.
    pub fn session(
        login_url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let mut login_body = StringMap::new();
        login_body.insert("login".to_string(), user.into());
        login_body.insert("password".to_string(), password.into());

        Self::Session {
            login_url: login_url.into(),
            login_body,
            token_path: DEFAULT_TOKEN_PATH.to_string(),
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
            token_prefix: None,
            expires_in_path: Some("$.expiresIn".to_string()),
        }
    }

    /// Short name of the auth type, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic { .. } => "basic",
            Self::Bearer { .. } => "bearer",
            Self::Session { .. } => "session",
        }
    }
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The session token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self {
            token,
            expires_at: Some(expires_at),
        }
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(30);
                Utc::now() + buffer >= expires_at
            }
            None => false,
        }
    }
}
