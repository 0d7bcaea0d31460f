use thiserror::Error;

/// Error type for password operations.
///
/// A wrong password is not an error: `verify` reports it as `false`.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}
