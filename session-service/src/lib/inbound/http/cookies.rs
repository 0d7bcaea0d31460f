//! Session cookies: the transport for access and refresh tokens.

use auth::TokenPair;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::cookie::SameSite;
use chrono::Duration;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// HttpOnly cookie carrying the access token, alive as long as the token.
pub fn access_cookie(token: &str, ttl: Duration) -> Cookie<'static> {
    session_cookie(ACCESS_COOKIE, token, ttl)
}

pub fn refresh_cookie(token: &str, ttl: Duration) -> Cookie<'static> {
    session_cookie(REFRESH_COOKIE, token, ttl)
}

fn session_cookie(name: &'static str, token: &str, ttl: Duration) -> Cookie<'static> {
    Cookie::build((name, token.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

/// Read a cookie value, treating an empty value as absent.
pub fn token_from(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Add both session cookies for a freshly issued pair.
pub fn with_session(jar: CookieJar, pair: &TokenPair, access_ttl: Duration, refresh_ttl: Duration) -> CookieJar {
    jar.add(access_cookie(pair.access_token(), access_ttl))
        .add(refresh_cookie(pair.refresh_token(), refresh_ttl))
}
