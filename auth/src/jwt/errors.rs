use thiserror::Error;

/// Error type for token operations.
///
/// Decoding only ever fails with `InvalidToken`; the reason string names the
/// failure mode and never contains the token itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Signing secret must not be empty")]
    MissingSecret,
}
