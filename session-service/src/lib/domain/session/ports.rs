use async_trait::async_trait;
use auth::TokenPair;

use crate::domain::session::errors::AuthError;
use crate::domain::session::models::AuthenticatedUser;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::models::RegisterCommand;

/// Port for credential operations: login, registration and refresh.
#[async_trait]
pub trait CredentialServicePort: Send + Sync + 'static {
    /// Verify username and password and issue a token pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password
    /// * `Directory` - Directory lookup failed
    /// * `Internal` - Hashing or token signing failed
    async fn login(&self, command: LoginCommand) -> Result<TokenPair, AuthError>;

    /// Create a user and issue a token pair for it.
    ///
    /// # Errors
    /// * `UsernameTaken` - Username already registered
    /// * `Directory` - Directory operation failed
    /// * `Internal` - Hashing or token signing failed
    async fn register(&self, command: RegisterCommand) -> Result<TokenPair, AuthError>;

    /// Mint a new access token from a refresh token.
    ///
    /// The returned pair carries the input refresh token unchanged.
    ///
    /// # Errors
    /// * `Unauthenticated` - Token missing, invalid or expired
    /// * `Internal` - Token signing failed
    async fn refresh(&self, refresh_token: Option<&str>) -> Result<TokenPair, AuthError>;
}

/// Port for resolving an access token to the user it was issued for.
#[async_trait]
pub trait SessionResolverPort: Send + Sync + 'static {
    /// # Errors
    /// * `Unauthenticated` - Token missing, invalid or expired
    /// * `UserNotFound` - Subject no longer exists in the directory
    /// * `Directory` - Directory lookup failed
    async fn resolve(&self, access_token: Option<&str>) -> Result<AuthenticatedUser, AuthError>;
}
