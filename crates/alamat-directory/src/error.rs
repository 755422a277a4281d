use alamat_core::DirectoryError;
use thiserror::Error;

/// Errors raised while building or filling a directory backend.
#[derive(Debug, Error)]
pub enum Error {
    /// SQLite open, schema or query failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// HTTP client construction or transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Candidate import file could not be decoded.
    #[error("invalid candidate data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Error> for DirectoryError {
    fn from(err: Error) -> Self {
        match err {
            Error::Json(e) => DirectoryError::Malformed(e.to_string()),
            other => DirectoryError::Unavailable(other.to_string()),
        }
    }
}

/// Result type alias for directory backend operations.
pub type Result<T> = std::result::Result<T, Error>;
