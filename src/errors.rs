//! Error types for geoimpact.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Errors that can occur in geoimpact operations.
#[derive(Error, Debug)]
pub enum GeoimpactError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend returned an error status
    #[error("backend API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid response structure
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Data validation failed
    #[error("Invalid analysis data: {0}")]
    Validation(String),
}
