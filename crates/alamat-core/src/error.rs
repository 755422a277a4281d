use thiserror::Error;

/// Errors that can occur during Alamat core operations.
#[derive(Debug, Error)]
pub enum AlamatError {
    /// The input string is empty or contains only whitespace.
    #[error("input is empty or whitespace-only")]
    EmptyInput,

    /// The tag predictor could not produce labels.
    #[error("tag predictor unavailable: {0}")]
    ModelUnavailable(String),

    /// A label string is not `O` or `(B|I)-TYPE`.
    #[error("malformed tag {tag:?}")]
    MalformedTag {
        /// The offending label.
        tag: String,
    },

    /// The predictor returned more labels than there are tokens.
    #[error("tag sequence misaligned: {tags} tags for {tokens} tokens")]
    TagAlignment {
        /// Number of tokens fed to the predictor.
        tokens: usize,
        /// Number of labels it returned.
        tags: usize,
    },

    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    RegexError(#[from] regex::Error),

    /// Directory loading or lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Errors raised by a [`DirectoryLookup`](crate::reconcile::DirectoryLookup) backend.
///
/// The reconciliation engine never propagates these; a failed lookup is
/// treated as a lookup that returned no candidates.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Transport failure, timeout or non-success status.
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    /// The directory answered but the payload could not be understood.
    #[error("malformed directory response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for DirectoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Result type alias for Alamat operations.
pub type Result<T> = std::result::Result<T, AlamatError>;
