//! Error types for campaign-cli
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Three kinds matter to an export run:
//! - validation errors (destination not empty) are fatal,
//! - query errors are contained by the extractor and only logged,
//! - write errors are fatal and abort the run.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for campaign-cli
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Query Errors
    // ============================================================================
    #[error("Query on schema '{schema}' failed: {message}")]
    Query { schema: String, message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("XML parsing error: {message}")]
    XmlParse { message: String },

    // ============================================================================
    // Destination Errors
    // ============================================================================
    #[error("Destination '{}' is not empty", path.display())]
    DestinationNotEmpty { path: PathBuf },

    #[error("Failed to write '{}': {message}", path.display())]
    Write { path: PathBuf, message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a query error for a schema
    pub fn query(schema: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Query {
            schema: schema.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an XML parse error
    pub fn xml(message: impl Into<String>) -> Self {
        Self::XmlParse {
            message: message.into(),
        }
    }

    /// Create a destination-not-empty validation error
    pub fn not_empty(path: impl Into<PathBuf>) -> Self {
        Self::DestinationNotEmpty { path: path.into() }
    }

    /// Create a write error
    pub fn write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Write {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a validation error (surfaced before any fetch)
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::DestinationNotEmpty { .. })
    }

    /// Whether this error must abort an export run.
    ///
    /// Transport and decoding failures are contained per page; everything
    /// touching the destination is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::Http(_)
                | Error::HttpStatus { .. }
                | Error::Query { .. }
                | Error::Decode { .. }
                | Error::XmlParse { .. }
                | Error::Auth { .. }
        )
    }
}

/// Result type alias for campaign-cli
pub type Result<T> = std::result::Result<T, Error>;
