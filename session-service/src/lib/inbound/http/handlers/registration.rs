use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use super::TokenPairResponseData;
use crate::domain::session::models::RegisterCommand;
use crate::domain::user::models::Username;
use crate::inbound::http::cookies;
use crate::inbound::http::router::AppState;
use crate::user::errors::UsernameError;

/// Register a new user and start a session for it.
pub async fn registration(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegistrationRequest>,
) -> Result<(CookieJar, ApiSuccess<TokenPairResponseData>), ApiError> {
    let pair = state
        .credential_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)?;

    let lifetimes = state.token_lifetimes;
    let jar = cookies::with_session(jar, &pair, lifetimes.access, lifetimes.refresh);

    Ok((jar, ApiSuccess::new(StatusCode::OK, (&pair).into())))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RegistrationRequest {
    username: String,
    password: String,
}

#[derive(Debug, Clone, Error)]
enum ParseRegistrationRequestError {
    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),
}

impl RegistrationRequest {
    fn try_into_command(self) -> Result<RegisterCommand, ParseRegistrationRequestError> {
        let username = Username::new(self.username)?;
        Ok(RegisterCommand::new(username, self.password))
    }
}

impl From<ParseRegistrationRequestError> for ApiError {
    fn from(err: ParseRegistrationRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}
