use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::TokenPair;
use tokio::sync::OnceCell;

use crate::domain::session::errors::AuthError;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::models::RegisterCommand;
use crate::domain::session::ports::CredentialServicePort;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::ports::UserDirectory;

/// Credential service: login, registration and access token refresh.
///
/// Stateless apart from the injected directory; password work runs on the
/// blocking pool.
pub struct CredentialService<UD>
where
    UD: UserDirectory,
{
    directory: Arc<UD>,
    authenticator: Arc<Authenticator>,
    /// Hash checked against when the username has no stored hash, so every
    /// login attempt costs one Argon2 verification.
    decoy_hash: OnceCell<String>,
}

const DECOY_PASSWORD: &str = "decoy-password-never-matches";

impl<UD> CredentialService<UD>
where
    UD: UserDirectory,
{
    /// Create a new credential service with injected dependencies.
    ///
    /// # Arguments
    /// * `directory` - User directory implementation
    /// * `authenticator` - Password hasher and token issuer
    pub fn new(directory: Arc<UD>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            directory,
            authenticator,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Verify `password` against the decoy hash, then reject.
    async fn reject_unknown(&self, password: String) -> AuthError {
        let decoy_hash = match self
            .decoy_hash
            .get_or_try_init(|| self.hash_password(DECOY_PASSWORD.to_string()))
            .await
        {
            Ok(hash) => hash.clone(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to prepare decoy hash");
                return AuthError::InvalidCredentials;
            }
        };

        let authenticator = Arc::clone(&self.authenticator);
        if let Err(e) = tokio::task::spawn_blocking(move || {
            authenticator.verify_password(&password, &decoy_hash)
        })
        .await
        {
            tracing::error!(error = %e, "Password verification task failed");
        }

        AuthError::InvalidCredentials
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(AuthError::from)
    }
}

#[async_trait]
impl<UD> CredentialServicePort for CredentialService<UD>
where
    UD: UserDirectory,
{
    async fn login(&self, command: LoginCommand) -> Result<TokenPair, AuthError> {
        let Ok(username) = Username::new(command.username) else {
            return Err(self.reject_unknown(command.password).await);
        };

        let Some(user) = self.directory.find_by_username(&username).await? else {
            tracing::warn!(username = %username, "Login rejected");
            return Err(self.reject_unknown(command.password).await);
        };

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password;
        let hashed_password = user.hashed_password;
        let subject = user.id.to_string();

        let result = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&password, &hashed_password, &subject)
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password verification task failed: {}", e)))?;

        match result {
            Ok(pair) => {
                tracing::info!(user_id = %user.id, "User logged in");
                Ok(pair)
            }
            Err(e) => {
                let err = AuthError::from(e);
                if err == AuthError::InvalidCredentials {
                    tracing::warn!(username = %username, "Login rejected");
                } else {
                    tracing::error!(user_id = %user.id, error = %err, "Login failed");
                }
                Err(err)
            }
        }
    }

    async fn register(&self, command: RegisterCommand) -> Result<TokenPair, AuthError> {
        let username = command.username;

        // Fast path only; the directory's uniqueness constraint is what closes
        // the race between concurrent registrations.
        if self.directory.find_by_username(&username).await?.is_some() {
            tracing::warn!(username = %username, "Registration rejected: username taken");
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        let hashed_password = self.hash_password(command.password).await?;

        let user = self
            .directory
            .create(NewUser::new(username, hashed_password))
            .await
            .map_err(AuthError::from)
            .inspect_err(|e| {
                if let AuthError::UsernameTaken(username) = e {
                    tracing::warn!(username = %username, "Registration lost uniqueness race");
                }
            })?;

        let pair = self.authenticator.issue_pair(&user.id.to_string())?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(pair)
    }

    async fn refresh(&self, refresh_token: Option<&str>) -> Result<TokenPair, AuthError> {
        let refresh_token = refresh_token.ok_or(AuthError::Unauthenticated)?;

        let claims = self
            .authenticator
            .validate_token(refresh_token)
            .map_err(|e| {
                tracing::debug!(reason = %e, "Refresh token rejected");
                AuthError::Unauthenticated
            })?;

        let user_id = UserId::from_subject(claims.subject()).map_err(|e| {
            tracing::debug!(reason = %e, "Refresh token subject rejected");
            AuthError::Unauthenticated
        })?;

        // Refresh trusts the token alone; no directory lookup.
        let access_token = self
            .authenticator
            .issue_access_token(&user_id.to_string())?;

        tracing::debug!(user_id = %user_id, "Access token refreshed");

        TokenPair::new(access_token, refresh_token.to_string()).map_err(AuthError::from)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use auth::TokenCodec;
    use chrono::Duration;
    use chrono::Utc;

    use super::*;
    use crate::domain::session::test_support::authenticator;
    use crate::domain::session::test_support::MockTestUserDirectory;
    use crate::domain::session::test_support::TEST_SECRET;
    use crate::domain::user::models::User;
    use crate::user::errors::UserError;

    fn stored_user(authenticator: &Authenticator, id: i64, username: &str, password: &str) -> User {
        User {
            id: UserId::new(id).unwrap(),
            username: Username::new(username.to_string()).unwrap(),
            hashed_password: authenticator.hash_password(password).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn login(username: &str, password: &str) -> LoginCommand {
        LoginCommand::new(username.to_string(), password.to_string())
    }

    fn register(username: &str, password: &str) -> RegisterCommand {
        RegisterCommand::new(Username::new(username.to_string()).unwrap(), password.to_string())
    }

    #[tokio::test]
    async fn test_login_success() {
        let authenticator = authenticator();
        let mut directory = MockTestUserDirectory::new();

        let user = stored_user(&authenticator, 7, "alice", "pw1");
        directory
            .expect_find_by_username()
            .withf(|u| u.as_str() == "alice")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = CredentialService::new(Arc::new(directory), Arc::clone(&authenticator));

        let pair = service.login(login("alice", "pw1")).await.unwrap();

        let access = authenticator.validate_token(pair.access_token()).unwrap();
        let refresh = authenticator.validate_token(pair.refresh_token()).unwrap();
        assert_eq!(access.subject(), "7");
        assert_eq!(refresh.subject(), "7");
    }

    #[tokio::test]
    async fn test_login_unknown_user_and_wrong_password_are_indistinguishable() {
        let authenticator = authenticator();
        let mut directory = MockTestUserDirectory::new();

        let user = stored_user(&authenticator, 7, "alice", "pw1");
        directory
            .expect_find_by_username()
            .returning(move |username| {
                if username.as_str() == "alice" {
                    Ok(Some(user.clone()))
                } else {
                    Ok(None)
                }
            });

        let service = CredentialService::new(Arc::new(directory), authenticator);

        let unknown = service.login(login("ghost", "x")).await.unwrap_err();
        let wrong = service.login(login("alice", "x")).await.unwrap_err();

        assert_eq!(unknown, AuthError::InvalidCredentials);
        assert_eq!(unknown, wrong);
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_login_malformed_username_is_invalid_credentials() {
        let mut directory = MockTestUserDirectory::new();
        directory.expect_find_by_username().times(0);

        let service = CredentialService::new(Arc::new(directory), authenticator());

        let result = service.login(login("", "pw")).await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidCredentials);
        assert!(service.decoy_hash.get().is_some());
    }

    #[tokio::test]
    async fn test_login_unknown_user_verifies_against_decoy_hash() {
        let mut directory = MockTestUserDirectory::new();
        directory.expect_find_by_username().returning(|_| Ok(None));

        let service = CredentialService::new(Arc::new(directory), authenticator());
        assert!(service.decoy_hash.get().is_none());

        let result = service.login(login("ghost", "pw")).await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidCredentials);

        let decoy = service.decoy_hash.get().expect("decoy hash not prepared");
        assert!(decoy.starts_with("$argon2id$"));
        assert!(!service.authenticator.verify_password("pw", decoy));
    }

    #[tokio::test]
    async fn test_login_unknown_user_costs_a_verification() {
        let authenticator = authenticator();
        let mut directory = MockTestUserDirectory::new();

        let user = stored_user(&authenticator, 7, "alice", "pw1");
        directory
            .expect_find_by_username()
            .returning(move |username| {
                if username.as_str() == "alice" {
                    Ok(Some(user.clone()))
                } else {
                    Ok(None)
                }
            });

        let service = CredentialService::new(Arc::new(directory), authenticator);

        // First rejection also prepares the decoy hash.
        service.login(login("ghost", "x")).await.unwrap_err();

        let started = Instant::now();
        service.login(login("ghost", "x")).await.unwrap_err();
        let unknown = started.elapsed();

        let started = Instant::now();
        service.login(login("alice", "x")).await.unwrap_err();
        let wrong = started.elapsed();

        assert!(
            unknown * 4 >= wrong,
            "unknown user took {:?}, wrong password took {:?}",
            unknown,
            wrong
        );
    }

    #[tokio::test]
    async fn test_login_corrupt_stored_hash_is_invalid_credentials() {
        let mut directory = MockTestUserDirectory::new();
        directory.expect_find_by_username().returning(|username| {
            Ok(Some(User {
                id: UserId::new(3).unwrap(),
                username: username.clone(),
                hashed_password: "not-a-phc-string".to_string(),
                created_at: Utc::now(),
            }))
        });

        let service = CredentialService::new(Arc::new(directory), authenticator());

        let result = service.login(login("alice", "pw")).await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_login_directory_failure() {
        let mut directory = MockTestUserDirectory::new();
        directory
            .expect_find_by_username()
            .returning(|_| Err(UserError::DatabaseError("connection refused".to_string())));

        let service = CredentialService::new(Arc::new(directory), authenticator());

        let result = service.login(login("alice", "pw")).await;
        assert!(matches!(result, Err(AuthError::Directory(_))));
    }

    #[tokio::test]
    async fn test_register_success() {
        let authenticator = authenticator();
        let mut directory = MockTestUserDirectory::new();

        directory
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        directory
            .expect_create()
            .withf(|user| {
                user.username.as_str() == "alice" && user.hashed_password.starts_with("$argon2")
            })
            .times(1)
            .returning(|user| {
                Ok(User {
                    id: UserId::new(11).unwrap(),
                    username: user.username,
                    hashed_password: user.hashed_password,
                    created_at: Utc::now(),
                })
            });

        let service = CredentialService::new(Arc::new(directory), Arc::clone(&authenticator));

        let pair = service.register(register("alice", "pw1")).await.unwrap();

        let access = authenticator.validate_token(pair.access_token()).unwrap();
        assert_eq!(access.subject(), "11");
    }

    #[tokio::test]
    async fn test_register_existing_username() {
        let authenticator = authenticator();
        let mut directory = MockTestUserDirectory::new();

        let user = stored_user(&authenticator, 1, "alice", "pw1");
        directory
            .expect_find_by_username()
            .returning(move |_| Ok(Some(user.clone())));
        directory.expect_create().times(0);

        let service = CredentialService::new(Arc::new(directory), authenticator);

        let result = service.register(register("alice", "pw2")).await;
        assert_eq!(
            result.unwrap_err(),
            AuthError::UsernameTaken("alice".to_string())
        );
    }

    #[tokio::test]
    async fn test_register_uniqueness_race_detected_by_directory() {
        let mut directory = MockTestUserDirectory::new();

        directory.expect_find_by_username().returning(|_| Ok(None));
        directory.expect_create().times(1).returning(|user| {
            Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ))
        });

        let service = CredentialService::new(Arc::new(directory), authenticator());

        let result = service.register(register("alice", "pw1")).await;
        assert_eq!(
            result.unwrap_err(),
            AuthError::UsernameTaken("alice".to_string())
        );
    }

    #[tokio::test]
    async fn test_refresh_keeps_refresh_token_and_mints_new_access_token() {
        let authenticator = authenticator();
        let mut directory = MockTestUserDirectory::new();
        directory.expect_find_by_id().times(0);
        directory.expect_find_by_username().times(0);

        let issued = authenticator
            .issue_pair_at("5", Utc::now() - Duration::minutes(5))
            .unwrap();

        let service = CredentialService::new(Arc::new(directory), Arc::clone(&authenticator));

        let pair = service
            .refresh(Some(issued.refresh_token()))
            .await
            .unwrap();

        assert_eq!(pair.refresh_token(), issued.refresh_token());
        assert_ne!(pair.access_token(), issued.access_token());

        let old = authenticator.validate_token(issued.access_token()).unwrap();
        let new = authenticator.validate_token(pair.access_token()).unwrap();
        assert_eq!(new.subject(), "5");
        assert!(new.expiration() > old.expiration());
    }

    #[tokio::test]
    async fn test_refresh_missing_token() {
        let service = CredentialService::new(
            Arc::new(MockTestUserDirectory::new()),
            authenticator(),
        );

        let result = service.refresh(None).await;
        assert_eq!(result.unwrap_err(), AuthError::Unauthenticated);
    }

    #[tokio::test]
    async fn test_refresh_invalid_or_expired_token() {
        let authenticator = authenticator();
        let service = CredentialService::new(
            Arc::new(MockTestUserDirectory::new()),
            Arc::clone(&authenticator),
        );

        let expired = authenticator
            .issue_pair_at("5", Utc::now() - Duration::days(31))
            .unwrap();

        assert_eq!(
            service.refresh(Some("garbage")).await.unwrap_err(),
            AuthError::Unauthenticated
        );
        assert_eq!(
            service
                .refresh(Some(expired.refresh_token()))
                .await
                .unwrap_err(),
            AuthError::Unauthenticated
        );
    }

    #[tokio::test]
    async fn test_refresh_non_numeric_subject() {
        let codec = TokenCodec::from_config(TEST_SECRET, "HS256").unwrap();
        let token = codec.encode("not-a-user-id", Duration::days(1)).unwrap();

        let service = CredentialService::new(
            Arc::new(MockTestUserDirectory::new()),
            authenticator(),
        );

        let result = service.refresh(Some(&token)).await;
        assert_eq!(result.unwrap_err(), AuthError::Unauthenticated);
    }
}
