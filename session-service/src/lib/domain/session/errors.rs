use auth::AuthenticationError;
use auth::JwtError;
use auth::PasswordError;
use thiserror::Error;

use crate::user::errors::UserError;
use crate::user::errors::UsernameError;

/// Errors surfaced by login, registration, refresh and session resolution.
///
/// None of the messages carry passwords, secrets or raw tokens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown username or wrong password; the two are indistinguishable.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username already exists: {0}")]
    UsernameTaken(String),

    /// Token missing, malformed, wrongly signed or expired.
    #[error("Authentication required")]
    Unauthenticated,

    /// Token was valid but its subject is no longer in the directory.
    #[error("User not found")]
    UserNotFound,

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    // Infrastructure errors
    #[error("User directory error: {0}")]
    Directory(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::UsernameAlreadyExists(username) => AuthError::UsernameTaken(username),
            UserError::InvalidUsername(e) => AuthError::InvalidUsername(e),
            UserError::InvalidUserId(_) | UserError::DatabaseError(_) => {
                AuthError::Directory(err.to_string())
            }
        }
    }
}

impl From<AuthenticationError> for AuthError {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::InvalidCredentials => AuthError::InvalidCredentials,
            AuthenticationError::PasswordError(_)
            | AuthenticationError::JwtError(_)
            | AuthenticationError::EmptyToken(_) => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<JwtError> for AuthError {
    /// Only reached on the issuing side; decode failures are mapped to
    /// `Unauthenticated` at the call site.
    fn from(err: JwtError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
