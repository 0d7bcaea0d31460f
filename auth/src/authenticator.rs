use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::TokenCodec;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Lifetimes of the two tokens in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl TokenLifetimes {
    pub fn new(access: Duration, refresh: Duration) -> Self {
        Self { access, refresh }
    }
}

impl Default for TokenLifetimes {
    /// 30 minute access tokens, 30 day refresh tokens.
    fn default() -> Self {
        Self {
            access: Duration::minutes(30),
            refresh: Duration::days(30),
        }
    }
}

/// Access/refresh token pair handed to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    access_token: String,
    refresh_token: String,
}

impl TokenPair {
    /// # Errors
    /// * `EmptyToken` - Either token is empty
    pub fn new(access_token: String, refresh_token: String) -> Result<Self, AuthenticationError> {
        if access_token.is_empty() {
            return Err(AuthenticationError::EmptyToken("access_token"));
        }
        if refresh_token.is_empty() {
            return Err(AuthenticationError::EmptyToken("refresh_token"));
        }

        Ok(Self {
            access_token,
            refresh_token,
        })
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn into_parts(self) -> (String, String) {
        (self.access_token, self.refresh_token)
    }
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),

    #[error("Empty {0}")]
    EmptyToken(&'static str),
}

/// Authentication coordinator combining password verification and token
/// issuance.
///
/// Holds no mutable state; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Authenticator {
    password_hasher: PasswordHasher,
    codec: TokenCodec,
    lifetimes: TokenLifetimes,
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `codec` - Token codec configured with the signing secret
    /// * `lifetimes` - Access and refresh token lifetimes
    pub fn new(codec: TokenCodec, lifetimes: TokenLifetimes) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            codec,
            lifetimes,
        }
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and issue a token pair for `subject`.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match the stored hash
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &str,
    ) -> Result<TokenPair, AuthenticationError> {
        if !self.verify_password(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        self.issue_pair(subject)
    }

    /// Issue a fresh access/refresh pair for `subject`.
    ///
    /// Both tokens share one clock reading.
    pub fn issue_pair(&self, subject: &str) -> Result<TokenPair, AuthenticationError> {
        self.issue_pair_at(subject, Utc::now())
    }

    pub fn issue_pair_at(
        &self,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AuthenticationError> {
        let access_token = self.codec.encode_at(subject, self.lifetimes.access, now)?;
        let refresh_token = self.codec.encode_at(subject, self.lifetimes.refresh, now)?;

        TokenPair::new(access_token, refresh_token)
    }

    /// Issue an access token only, used by refresh.
    ///
    /// `exp` has one second resolution, so a token issued within the same
    /// second as an earlier one for the same subject is byte-identical to it.
    pub fn issue_access_token(&self, subject: &str) -> Result<String, JwtError> {
        self.issue_access_token_at(subject, Utc::now())
    }

    pub fn issue_access_token_at(
        &self,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        self.codec.encode_at(subject, self.lifetimes.access, now)
    }

    /// Verify a token and return its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.codec.decode(token)
    }

    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        self.codec.decode_at(token, now)
    }
}
