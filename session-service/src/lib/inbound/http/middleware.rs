use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use super::cookies;
use super::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Middleware that resolves the access cookie to a user and adds it to the
/// request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let access_token = cookies::token_from(&jar, cookies::ACCESS_COOKIE);

    let user = state
        .session_resolver
        .resolve(access_token.as_deref())
        .await
        .map_err(ApiError::from)?;

    tracing::debug!(user_id = %user.id, "Session resolved");
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
