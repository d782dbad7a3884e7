//! HTTP client module
//!
//! Thin `reqwest` wrapper used to reach the remote server.
//!
//! # Features
//!
//! - **Base URL**: relative paths are joined onto the server URL
//! - **Authentication**: integration with the auth module
//! - **Single attempt**: every request is sent once; non-2xx statuses are
//!   errors

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig, TextResponse};
