mod applications;
mod auth;
mod chatbot;
mod config;
mod db;
mod employees;
mod errors;
mod http;
mod jobs;
mod models;
mod profiles;
mod routes;
mod state;
mod store;
mod users;
mod validation;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{GoogleOAuth, TokenService};
use crate::chatbot::ChatbotClient;
use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting portal API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs pending migrations)
    let pool = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(pool));

    let tokens = TokenService::new(&config.secret_key);

    let chatbot = ChatbotClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())
        .context("Failed to build chatbot HTTP client")?;
    if config.gemini_api_key.is_some() {
        info!("Chatbot client initialized (model: {})", chatbot.model());
    } else {
        warn!("GEMINI_API_KEY not set; chatbot replies will report the missing key");
    }

    let oauth = match config.google_credentials() {
        Some((client_id, client_secret)) => {
            let client = GoogleOAuth::new(client_id, client_secret, config.oauth_redirect_url.clone())
                .context("Failed to build Google OAuth client")?;
            info!("Google login enabled (redirect: {})", config.oauth_redirect_url);
            Some(client)
        }
        None => {
            warn!("Google login disabled: GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not set");
            None
        }
    };

    let state = AppState {
        store,
        tokens,
        chatbot,
        oauth,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
