// In crates/api-client/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// A non-2xx response. The display text is what lands in a failed slice.
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(#[from] serde_json::Error),
    #[error("Failed to encode payload: {0}")]
    Encode(serde_json::Error),
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Push connection is not open")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, Error>;
