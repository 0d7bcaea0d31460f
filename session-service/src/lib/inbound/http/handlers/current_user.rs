use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiSuccess;
use crate::domain::session::models::AuthenticatedUser;

pub async fn current_user(
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiSuccess<CurrentUserResponseData> {
    ApiSuccess::new(StatusCode::OK, (&user).into())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUserResponseData {
    pub id: i64,
    pub username: String,
}

impl From<&AuthenticatedUser> for CurrentUserResponseData {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            id: user.id.value(),
            username: user.username.as_str().to_string(),
        }
    }
}
