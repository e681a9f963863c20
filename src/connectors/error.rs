// src/connectors/error.rs
use thiserror::Error;

/// Transport, decoding and signing failures reported by the external
/// collaborators (data client and submitter).
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API returned code {code}: {message}")]
    Api { code: i32, message: String },

    #[error("JSON decoding error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid number in field {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Request rejected: {0}")]
    Rejected(String),
}
