use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;

use super::ApiError;
use super::ApiSuccess;
use super::TokenPairResponseData;
use crate::inbound::http::cookies;
use crate::inbound::http::router::AppState;

/// Exchange the refresh cookie for a new access token.
///
/// Only the access cookie is replaced; the refresh cookie is left as is.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<TokenPairResponseData>), ApiError> {
    let refresh_token = cookies::token_from(&jar, cookies::REFRESH_COOKIE);

    let pair = state
        .credential_service
        .refresh(refresh_token.as_deref())
        .await
        .map_err(ApiError::from)?;

    let jar = jar.add(cookies::access_cookie(
        pair.access_token(),
        state.token_lifetimes.access,
    ));

    Ok((jar, ApiSuccess::new(StatusCode::OK, (&pair).into())))
}
