//! Authentication module
//!
//! Supports: Basic, Bearer, and Session (login endpoint returning a token)
//!
//! The `Authenticator` produces the authenticated session handle used by
//! every query: it applies credentials to outgoing requests and caches the
//! session token obtained at login.

mod authenticator;
mod types;

pub use authenticator::{extract_jsonpath, Authenticator};
pub use types::{
    AuthConfig, CachedToken, DEFAULT_LOGIN_PATH, DEFAULT_TOKEN_HEADER, DEFAULT_TOKEN_PATH,
};
