//! Request error type shared by API calls and attachment downloads.

use thiserror::Error;

/// Why a single HTTP request produced no usable data. Always non-fatal for the
/// run: callers turn it into "no data" or an entity skip.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection refused, DNS, etc.).
    #[error("transport: {0}")]
    Curl(#[from] curl::Error),
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Response was not `application/json`.
    #[error("unexpected content type {}", .0.as_deref().unwrap_or("(none)"))]
    NotJson(Option<String>),
    /// Body claimed to be JSON but did not decode into the expected shape.
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
    /// Envelope had no `data` member, or it was null.
    #[error("response has no data")]
    MissingData,
    /// Writing a downloaded body to disk failed.
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
}
