use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;

use crate::domain::session::errors::AuthError;
use crate::domain::session::models::AuthenticatedUser;
use crate::domain::session::ports::SessionResolverPort;
use crate::domain::user::models::UserId;
use crate::user::ports::UserDirectory;

/// Resolves access tokens to the users they were issued for.
pub struct SessionResolver<UD>
where
    UD: UserDirectory,
{
    directory: Arc<UD>,
    authenticator: Arc<Authenticator>,
}

impl<UD> SessionResolver<UD>
where
    UD: UserDirectory,
{
    pub fn new(directory: Arc<UD>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            directory,
            authenticator,
        }
    }
}

#[async_trait]
impl<UD> SessionResolverPort for SessionResolver<UD>
where
    UD: UserDirectory,
{
    async fn resolve(&self, access_token: Option<&str>) -> Result<AuthenticatedUser, AuthError> {
        let access_token = access_token.ok_or(AuthError::Unauthenticated)?;

        let claims = self
            .authenticator
            .validate_token(access_token)
            .map_err(|e| {
                tracing::debug!(reason = %e, "Access token rejected");
                AuthError::Unauthenticated
            })?;

        let user_id = UserId::from_subject(claims.subject()).map_err(|e| {
            tracing::debug!(reason = %e, "Access token subject rejected");
            AuthError::Unauthenticated
        })?;

        let user = self.directory.find_by_id(&user_id).await?.ok_or_else(|| {
            tracing::warn!(user_id = %user_id, "Token subject not found in directory");
            AuthError::UserNotFound
        })?;

        Ok(user.into())
    }
}
