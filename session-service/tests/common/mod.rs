use std::sync::Arc;

use auth::Authenticator;
use auth::TokenCodec;
use auth::TokenLifetimes;
use reqwest::header::COOKIE;
use serde_json::json;
use session_service::inbound::http::router::create_router;
use session_service::inbound::http::router::AppState;
use session_service::outbound::repositories::InMemoryUserDirectory;

pub const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const ROOT_PATH: &str = "/v1";

/// Test application that spawns a real server over an in-memory directory
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub directory: Arc<InMemoryUserDirectory>,
    /// Client that keeps cookies between requests, like a browser
    pub api_client: reqwest::Client,
    /// Client without a cookie store, for hand-crafted Cookie headers
    pub raw_client: reqwest::Client,
    /// Shares the server's secret, for minting tokens the server will accept
    pub authenticator: Authenticator,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let authenticator = Authenticator::new(
            TokenCodec::from_config(TEST_SECRET, "HS256").expect("Failed to build codec"),
            TokenLifetimes::default(),
        );

        let directory = Arc::new(InMemoryUserDirectory::new());
        let state = AppState::from_directory(
            Arc::clone(&directory),
            Arc::new(authenticator.clone()),
        );

        let router = create_router(state, ROOT_PATH, &["http://localhost:3000".to_string()]);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            directory,
            api_client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to create reqwest client"),
            raw_client: reqwest::Client::new(),
            authenticator,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.address, ROOT_PATH, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    /// Helper to make GET request with explicit cookies
    pub fn get_with_cookies(&self, path: &str, cookies: &[(&str, &str)]) -> reqwest::RequestBuilder {
        self.raw_client
            .get(self.url(path))
            .header(COOKIE, cookie_header(cookies))
    }

    /// Helper to make POST request with explicit cookies
    pub fn post_with_cookies(&self, path: &str, cookies: &[(&str, &str)]) -> reqwest::RequestBuilder {
        self.raw_client
            .post(self.url(path))
            .header(COOKIE, cookie_header(cookies))
    }

    /// Register a user through the API and return the issued tokens
    pub async fn register(&self, username: &str, password: &str) -> (String, String) {
        let response = self
            .post("/auth/registration")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert!(response.status().is_success(), "registration failed");

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        (
            body["data"]["access_token"].as_str().unwrap().to_string(),
            body["data"]["refresh_token"].as_str().unwrap().to_string(),
        )
    }
}

fn cookie_header(cookies: &[(&str, &str)]) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Value of a Set-Cookie entry on a response, if present
pub fn set_cookie(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .cookies()
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}
