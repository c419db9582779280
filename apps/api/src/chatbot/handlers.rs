use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::http::JsonBody;
use crate::state::AppState;
use crate::validation::non_blank;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub prompt: Option<String>,
}

/// POST /api/chatbot/ask
pub async fn handle_ask(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AskRequest>,
) -> Result<Json<Value>, AppError> {
    let prompt =
        non_blank(req.prompt).ok_or_else(|| AppError::Validation("Prompt is required".to_string()))?;
    let reply = state.chatbot.ask(&prompt).await;
    Ok(Json(json!({ "response": reply })))
}
