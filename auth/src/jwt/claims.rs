use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Session token claims.
///
/// Exactly two claims are issued and trusted: the subject (user id as a
/// string) and the expiration (Unix timestamp, seconds). Anything else present
/// in a decoded payload is dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    sub: String,
    exp: i64,
}

impl Claims {
    /// Build claims for a subject expiring at `expires_at`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Subject is empty
    pub fn new(subject: impl ToString, expires_at: DateTime<Utc>) -> Result<Self, JwtError> {
        let sub = subject.to_string();
        if sub.is_empty() {
            return Err(JwtError::EncodingFailed(
                "subject claim must not be empty".to_string(),
            ));
        }

        Ok(Self {
            sub,
            exp: expires_at.timestamp(),
        })
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Expiration as a Unix timestamp.
    pub fn expiration(&self) -> i64 {
        self.exp
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// A token is valid while `exp > now`; at `exp` itself it is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp <= current_timestamp
    }
}
