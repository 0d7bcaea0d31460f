use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// Signs and verifies session tokens.
///
/// Only HMAC algorithms are accepted: signing and verification share one
/// secret, so verification needs no state beyond this value. The codec is
/// built once from configuration and passed to whoever needs it.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec for a shared secret and an HMAC algorithm.
    ///
    /// # Arguments
    /// * `secret` - Signing secret
    /// * `algorithm` - One of `HS256`, `HS384`, `HS512`
    ///
    /// # Errors
    /// * `MissingSecret` - Secret is empty
    /// * `UnsupportedAlgorithm` - Algorithm is not HMAC based
    pub fn new(secret: &[u8], algorithm: Algorithm) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::MissingSecret);
        }

        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(JwtError::UnsupportedAlgorithm(format!("{:?}", algorithm)));
        }

        let mut validation = Validation::new(algorithm);
        // Expiry is checked against an explicit clock reading in `decode_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            validation,
        })
    }

    /// Create a codec from configuration values, e.g. `("SECRET", "HS256")`.
    pub fn from_config(secret: &str, algorithm: &str) -> Result<Self, JwtError> {
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|_| JwtError::UnsupportedAlgorithm(algorithm.to_string()))?;

        Self::new(secret.as_bytes(), algorithm)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Encode a token for `subject` that expires `ttl` from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Empty subject, non-positive or out of range `ttl`,
    ///   or signing failed
    pub fn encode(&self, subject: &str, ttl: Duration) -> Result<String, JwtError> {
        self.encode_at(subject, ttl, Utc::now())
    }

    /// Encode a token for `subject` that expires `ttl` after `now`.
    pub fn encode_at(
        &self,
        subject: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        if ttl <= Duration::zero() {
            return Err(JwtError::EncodingFailed(
                "token lifetime must be positive".to_string(),
            ));
        }

        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            JwtError::EncodingFailed("token lifetime out of range".to_string())
        })?;

        let claims = Claims::new(subject, expires_at)?;

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify and decode a token against the current time.
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, wrong algorithm, malformed structure,
    ///   missing claim, or expired
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        self.decode_at(token, Utc::now())
    }

    /// Verify and decode a token against the clock reading `now`.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| JwtError::InvalidToken(format!("{:?}", e.kind())))?;

        let claims = token_data.claims;

        if claims.subject().is_empty() {
            return Err(JwtError::InvalidToken("empty subject".to_string()));
        }

        if claims.is_expired(now.timestamp()) {
            return Err(JwtError::InvalidToken("token expired".to_string()));
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
