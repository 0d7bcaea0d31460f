use std::sync::Arc;

use auth::Authenticator;
use auth::TokenCodec;
use session_service::config::Config;
use session_service::config::DirectoryBackend;
use session_service::inbound::http::router::create_router;
use session_service::inbound::http::router::AppState;
use session_service::outbound::repositories::InMemoryUserDirectory;
use session_service::outbound::repositories::PostgresUserDirectory;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "session-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        root_path = %config.server.root_path,
        directory = ?config.directory.backend,
        algorithm = %config.security.algorithm,
        access_token_expire_minutes = config.security.access_token_expire_minutes,
        refresh_token_expire_days = config.security.refresh_token_expire_days,
        "Configuration loaded"
    );

    if config.security.secret_key == "SECRET" {
        tracing::warn!("Using the built-in signing secret; set SECURITY__SECRET_KEY");
    }

    let codec = TokenCodec::from_config(&config.security.secret_key, &config.security.algorithm)?;
    let authenticator = Arc::new(Authenticator::new(codec, config.token_lifetimes()?));

    let state = match config.directory.backend {
        DirectoryBackend::Postgres => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(&config.database_url())
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                host = %config.database.host,
                database = %config.database.name,
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            AppState::from_directory(
                Arc::new(PostgresUserDirectory::new(pg_pool)),
                Arc::clone(&authenticator),
            )
        }
        DirectoryBackend::Memory => {
            tracing::warn!("Using the in-memory user directory; users are lost on restart");
            AppState::from_directory(
                Arc::new(InMemoryUserDirectory::new()),
                Arc::clone(&authenticator),
            )
        }
    };

    let http_application = create_router(
        state,
        &config.server.root_path,
        &config.security.cors_origins,
    );

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Application shutdown");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
