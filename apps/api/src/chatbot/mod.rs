//! Chatbot client: relays a single prompt to Gemini `generateContent`.
//!
//! Every outcome, including transport failures, is folded into the reply
//! text so callers always have something to show.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod handlers;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ChatbotError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("Error: {status} - {body}")]
    Api { status: u16, body: String },
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Clone)]
pub struct ChatbotClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl ChatbotClient {
    pub fn new(api_key: Option<String>, model: String) -> Result<Self, ChatbotError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_API_BASE}/{}:generateContent", self.model)
    }

    /// Returns the model's reply, or a human-readable error string.
    pub async fn ask(&self, prompt: &str) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("Chatbot called without GEMINI_API_KEY");
            return "Error: GEMINI_API_KEY is not configured".to_string();
        };

        match self.call(prompt, api_key).await {
            Ok(reply) => reply,
            Err(e @ ChatbotError::Api { .. }) => {
                warn!("Gemini returned an error: {e}");
                e.to_string()
            }
            Err(ChatbotError::Http(e)) => {
                warn!("Gemini call failed: {e}");
                format!("Exception while calling Gemini: {e}")
            }
        }
    }

    async fn call(&self, prompt: &str, api_key: &str) -> Result<String, ChatbotError> {
        let request_body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatbotError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        debug!("Gemini call succeeded");
        Ok(reply_text(&body))
    }
}

/// First candidate's first text part, or the whole response as JSON.
fn reply_text(response: &Value) -> String {
    response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| response.to_string())
}
