use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub salary: Option<String>,
    /// Comma-separated, free text.
    pub tags: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Posting fields as submitted. Used for both create and partial update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub salary: Option<String>,
    pub tags: Option<String>,
}
