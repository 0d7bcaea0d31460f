use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::TokenLifetimes;
use axum::body::Body;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::AllowHeaders;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::authorization::authorization;
use super::handlers::current_user::current_user;
use super::handlers::refresh::refresh;
use super::handlers::registration::registration;
use super::middleware::require_session;
use crate::domain::session::ports::CredentialServicePort;
use crate::domain::session::ports::SessionResolverPort;
use crate::domain::session::resolver::SessionResolver;
use crate::domain::session::service::CredentialService;
use crate::user::ports::UserDirectory;

#[derive(Clone)]
pub struct AppState {
    pub credential_service: Arc<dyn CredentialServicePort>,
    pub session_resolver: Arc<dyn SessionResolverPort>,
    pub token_lifetimes: TokenLifetimes,
}

impl AppState {
    /// Wire both session services over one directory and authenticator.
    pub fn from_directory<UD>(directory: Arc<UD>, authenticator: Arc<Authenticator>) -> Self
    where
        UD: UserDirectory,
    {
        let token_lifetimes = authenticator.lifetimes();

        Self {
            credential_service: Arc::new(CredentialService::new(
                Arc::clone(&directory),
                Arc::clone(&authenticator),
            )),
            session_resolver: Arc::new(SessionResolver::new(directory, authenticator)),
            token_lifetimes,
        }
    }
}

pub fn create_router(state: AppState, root_path: &str, cors_origins: &[String]) -> Router {
    let public_routes = Router::new()
        .route("/auth/authorization", post(authorization))
        .route("/auth/registration", post(registration))
        .route("/auth/refresh", post(refresh));

    let protected_routes = Router::new()
        .route("/users/me", get(current_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let api = Router::new().merge(public_routes).merge(protected_routes);

    let routes = match normalize_root_path(root_path) {
        Some(prefix) => Router::new().nest(&prefix, api),
        None => api,
    };

    // Request headers are left out of the span: they carry session cookies.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    routes
        .layer(trace_layer)
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// `""` and `"/"` mount at the root; anything else gets a single leading
/// slash and no trailing one.
fn normalize_root_path(root_path: &str) -> Option<String> {
    let trimmed = root_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{}", trimmed))
    }
}

fn cors_layer(cors_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::PUT])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
