//! Router harness for handler tests: an `AppState` over [`MemoryStore`] and
//! helpers that drive requests through `build_router` with `oneshot`.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::{GoogleOAuth, TokenService};
use crate::chatbot::ChatbotClient;
use crate::config::Config;
use crate::models::user::{Role, User};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::memory::MemoryStore;
use crate::store::{NewUser, Store};

pub const TEST_SECRET: &str = "test-secret";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/portal_test".to_string(),
        secret_key: TEST_SECRET.to_string(),
        gemini_api_key: None,
        gemini_model: "gemini-pro".to_string(),
        google_client_id: None,
        google_client_secret: None,
        oauth_redirect_url: "http://localhost:8080/api/auth/google/callback".to_string(),
        frontend_url: "http://localhost:5173".to_string(),
        port: 8080,
        rust_log: "debug".to_string(),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// `Value::Null` for an empty body, a JSON string for non-JSON bodies.
    pub body: Value,
}

impl TestResponse {
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

pub struct TestApp {
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let config = test_config();
        let state = AppState {
            store: Arc::new(MemoryStore::new()),
            tokens: TokenService::new(&config.secret_key),
            chatbot: ChatbotClient::new(None, config.gemini_model.clone()).unwrap(),
            oauth: None,
            config,
        };
        Self { state }
    }

    pub fn with_google_login() -> Self {
        let mut app = Self::new();
        app.state.oauth = Some(
            GoogleOAuth::new(
                "client-123".to_string(),
                "client-secret".to_string(),
                app.state.config.oauth_redirect_url.clone(),
            )
            .unwrap(),
        );
        app
    }

    pub fn store(&self) -> &dyn Store {
        self.state.store.as_ref()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = build_router(self.state.clone())
            .oneshot(request)
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body), None).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(body), None).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None, None).await
    }

    /// Inserts an account directly, skipping password hashing.
    pub async fn seed_user(&self, first_name: &str, email: &str, role: Role) -> User {
        self.seed_user_with_phone(first_name, email, role, None).await
    }

    pub async fn seed_user_with_phone(
        &self,
        first_name: &str,
        email: &str,
        role: Role,
        phone: Option<&str>,
    ) -> User {
        self.store()
            .create_user(NewUser {
                first_name: first_name.to_string(),
                last_name: "Sharma".to_string(),
                company_name: None,
                email: email.to_string(),
                password_hash: None,
                role,
                phone: phone.map(str::to_string),
            })
            .await
            .unwrap()
    }
}
