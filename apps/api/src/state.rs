use std::sync::Arc;

use crate::auth::{GoogleOAuth, TokenService};
use crate::chatbot::ChatbotClient;
use crate::config::Config;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Persistence for every resource. `PgStore` in production.
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub chatbot: ChatbotClient,
    /// `None` when Google client credentials are not configured.
    pub oauth: Option<GoogleOAuth>,
    pub config: Config,
}
