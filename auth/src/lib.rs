//! Session authentication primitives.
//!
//! - Password hashing (Argon2id)
//! - Signed session tokens (HMAC JWT with `sub` and `exp` only)
//! - Token pair issuance
//!
//! Services own their user storage and adapt these building blocks.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Tokens
//! ```
//! use auth::TokenCodec;
//! use chrono::Duration;
//!
//! let codec = TokenCodec::from_config("secret_key_at_least_32_bytes_long!", "HS256").unwrap();
//! let token = codec.encode("42", Duration::minutes(30)).unwrap();
//! let claims = codec.decode(&token).unwrap();
//! assert_eq!(claims.subject(), "42");
//! ```
//!
//! ## Token Pairs
//! ```
//! use auth::{Authenticator, TokenCodec, TokenLifetimes};
//!
//! let codec = TokenCodec::from_config("secret_key_at_least_32_bytes_long!", "HS256").unwrap();
//! let auth = Authenticator::new(codec, TokenLifetimes::default());
//!
//! let hash = auth.hash_password("password123").unwrap();
//! let pair = auth.authenticate("password123", &hash, "42").unwrap();
//! let claims = auth.validate_token(pair.access_token()).unwrap();
//! assert_eq!(claims.subject(), "42");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::TokenLifetimes;
pub use authenticator::TokenPair;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::TokenCodec;
pub use password::PasswordError;
pub use password::PasswordHasher;
