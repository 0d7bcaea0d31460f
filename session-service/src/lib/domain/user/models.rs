use std::fmt;

use chrono::DateTime;
use chrono::Utc;

use crate::user::errors::UserIdError;
use crate::user::errors::UsernameError;

/// User record held by the directory.
///
/// `hashed_password` is an Argon2 PHC string, never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

/// User unique identifier, assigned by the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a directory-assigned id.
    ///
    /// # Errors
    /// * `NotPositive` - Id is zero or negative
    pub fn new(id: i64) -> Result<Self, UserIdError> {
        if id > 0 {
            Ok(Self(id))
        } else {
            Err(UserIdError::NotPositive(id))
        }
    }

    /// Parse a user ID from a token subject.
    ///
    /// # Errors
    /// * `InvalidFormat` - Subject is not an integer
    /// * `NotPositive` - Subject is zero or negative
    pub fn from_subject(subject: &str) -> Result<Self, UserIdError> {
        let id = subject
            .parse::<i64>()
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))?;
        Self::new(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Non-empty, at most 64 characters, no leading or trailing whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub const MAX_LENGTH: usize = 64;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `Empty` - Username is empty
    /// * `TooLong` - Username longer than 64 characters
    /// * `SurroundingWhitespace` - Leading or trailing whitespace
    pub fn new(username: String) -> Result<Self, UsernameError> {
        if username.is_empty() {
            return Err(UsernameError::Empty);
        }

        let length = username.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        if username.trim() != username {
            return Err(UsernameError::SurroundingWhitespace);
        }

        Ok(Self(username))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// User to be inserted into the directory; the directory assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub hashed_password: String,
}

impl NewUser {
    pub fn new(username: Username, hashed_password: String) -> Self {
        Self {
            username,
            hashed_password,
        }
    }
}
