// Crate-wide error type

use thiserror::Error;

/// Every failure the pipeline can surface. The UI/CLI layer converts these
/// to transient user-facing messages; nothing is retried automatically.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    /// Network unreachable, DNS failure, connection reset.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    /// Non-2xx response with a server-supplied message, surfaced verbatim.
    #[error("{message}")]
    Api { message: String },

    /// Malformed envelope, wrong key, corrupt ciphertext. The user-facing
    /// message stays generic; the cause is kept for logging only.
    #[error("failed to load or decrypt response data")]
    Decrypt { reason: String },

    #[error("unexpected response format from server")]
    UnexpectedFormat,

    #[error("no consultations selected for export")]
    EmptySelection,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("spreadsheet error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, Error>;
