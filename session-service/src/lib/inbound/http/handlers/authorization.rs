use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::TokenPairResponseData;
use crate::domain::session::models::LoginCommand;
use crate::inbound::http::cookies;
use crate::inbound::http::router::AppState;

/// Log in with username and password; sets both session cookies.
pub async fn authorization(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<AuthorizationRequest>,
) -> Result<(CookieJar, ApiSuccess<TokenPairResponseData>), ApiError> {
    let pair = state
        .credential_service
        .login(body.into_command())
        .await
        .map_err(ApiError::from)?;

    let lifetimes = state.token_lifetimes;
    let jar = cookies::with_session(jar, &pair, lifetimes.access, lifetimes.refresh);

    Ok((jar, ApiSuccess::new(StatusCode::OK, (&pair).into())))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorizationRequest {
    username: String,
    password: String,
}

impl AuthorizationRequest {
    fn into_command(self) -> LoginCommand {
        LoginCommand::new(self.username, self.password)
    }
}
