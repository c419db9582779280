use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::http::{created, message, JsonBody, PathParam};
use crate::models::application::{Application, ApplicationStatus};
use crate::state::AppState;
use crate::store::NewApplication;

#[derive(Debug, Deserialize)]
pub struct CreateApplicationRequest {
    pub user_id: Option<i64>,
    pub job_id: Option<i64>,
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateApplicationRequest {
    pub status: Option<ApplicationStatus>,
}

fn application_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Application {id} not found"))
}

/// GET /api/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
) -> Result<Json<Vec<Application>>, AppError> {
    Ok(Json(state.store.list_applications().await?))
}

/// GET /api/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Application>, AppError> {
    let application = state
        .store
        .get_application(id)
        .await?
        .ok_or_else(|| application_not_found(id))?;
    Ok(Json(application))
}

/// POST /api/applications
pub async fn handle_create_application(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let (Some(user_id), Some(job_id)) = (req.user_id, req.job_id) else {
        return Err(AppError::Validation(
            "user_id and job_id are required".to_string(),
        ));
    };

    let previous = state.store.count_applications(user_id, job_id).await?;
    if previous > 0 {
        warn!(user_id, job_id, previous, "Repeat application accepted");
    }

    let application = state
        .store
        .create_application(NewApplication {
            user_id,
            job_id,
            status: req.status.unwrap_or_default(),
        })
        .await?;

    info!(application_id = application.id, user_id, job_id, "Application created");
    Ok(created("Application created", application.id))
}

/// PUT /api/applications/:id
///
/// Only the status can change.
pub async fn handle_update_application(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(req): JsonBody<UpdateApplicationRequest>,
) -> Result<Json<Value>, AppError> {
    let found = match req.status {
        Some(status) => state.store.update_application_status(id, status).await?,
        None => state.store.get_application(id).await?,
    };
    found.ok_or_else(|| application_not_found(id))?;
    Ok(message("Application updated"))
}

/// DELETE /api/applications/:id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Value>, AppError> {
    if !state.store.delete_application(id).await? {
        return Err(application_not_found(id));
    }
    Ok(message("Application deleted"))
}
