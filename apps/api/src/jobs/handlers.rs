use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::http::{created, message, JsonBody, PathParam};
use crate::models::job::{Job, JobFields};
use crate::state::AppState;
use crate::validation::non_blank;

fn job_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Job {id} not found"))
}

/// GET /api/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(state.store.list_jobs().await?))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Job>, AppError> {
    let job = state.store.get_job(id).await?.ok_or_else(|| job_not_found(id))?;
    Ok(Json(job))
}

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    JsonBody(mut fields): JsonBody<JobFields>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    fields.title = Some(
        non_blank(fields.title).ok_or_else(|| AppError::Validation("Title is required".to_string()))?,
    );
    let job = state.store.create_job(fields).await?;
    info!(job_id = job.id, "Job created");
    Ok(created("Job created", job.id))
}

/// PUT /api/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(mut fields): JsonBody<JobFields>,
) -> Result<Json<Value>, AppError> {
    if let Some(title) = fields.title.take() {
        fields.title = Some(
            non_blank(Some(title))
                .ok_or_else(|| AppError::Validation("Title cannot be empty".to_string()))?,
        );
    }
    state
        .store
        .update_job(id, fields)
        .await?
        .ok_or_else(|| job_not_found(id))?;
    Ok(message("Job updated"))
}

/// DELETE /api/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Value>, AppError> {
    if !state.store.delete_job(id).await? {
        return Err(job_not_found(id));
    }
    info!(job_id = id, "Job deleted");
    Ok(message("Job deleted"))
}
