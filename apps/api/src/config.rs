use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// HMAC secret used to sign session tokens.
    pub secret_key: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub oauth_redirect_url: String,
    /// Where the browser lands after a completed OAuth login.
    pub frontend_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            secret_key: require_env("SECRET_KEY")?,
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL").unwrap_or_else(|| "gemini-pro".to_string()),
            google_client_id: optional_env("GOOGLE_CLIENT_ID"),
            google_client_secret: optional_env("GOOGLE_CLIENT_SECRET"),
            oauth_redirect_url: optional_env("OAUTH_REDIRECT_URL").unwrap_or_else(|| {
                format!("http://localhost:{port}/api/auth/google/callback")
            }),
            frontend_url: optional_env("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
            port,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Returns `(client_id, client_secret)` when Google login is fully configured.
    pub fn google_credentials(&self) -> Option<(String, String)> {
        match (&self.google_client_id, &self.google_client_secret) {
            (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
            _ => None,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
