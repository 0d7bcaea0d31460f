use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::TokenCodec;
use auth::TokenLifetimes;
use mockall::mock;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserDirectory;
use crate::user::errors::UserError;

pub const TEST_SECRET: &str = "test_secret_key_at_least_32_bytes!";

mock! {
    pub TestUserDirectory {}

    #[async_trait]
    impl UserDirectory for TestUserDirectory {
        async fn create(&self, user: NewUser) -> Result<User, UserError>;
        async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
        async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
    }
}

pub fn authenticator() -> Arc<Authenticator> {
    let codec = TokenCodec::from_config(TEST_SECRET, "HS256").expect("Failed to build codec");
    Arc::new(Authenticator::new(codec, TokenLifetimes::default()))
}
