use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::http::{created, message, JsonBody, PathParam};
use crate::models::profile::{ExperienceFields, Profile, ProfileDetail, ProfileFields};
use crate::state::AppState;
use crate::store::{NewProfile, StoreError};

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub user_id: Option<i64>,
    #[serde(flatten)]
    pub fields: ProfileFields,
}

/// Experience payload as sent by clients. JSON has no date type, so the
/// dates arrive untyped.
#[derive(Debug, Default, Deserialize)]
pub struct ExperienceRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<Value>,
    pub end_date: Option<Value>,
}

impl ExperienceRequest {
    /// Request bodies never populate the date fields. A non-null date is a
    /// `TypeMismatch` (500); null or absent dates are accepted.
    fn into_fields(self) -> Result<ExperienceFields, StoreError> {
        Ok(ExperienceFields {
            title: self.title,
            company: self.company,
            start_date: untyped_date("start_date", self.start_date)?,
            end_date: untyped_date("end_date", self.end_date)?,
            description: self.description,
        })
    }
}

fn untyped_date(column: &str, value: Option<Value>) -> Result<Option<NaiveDate>, StoreError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(other) => {
            warn!("Untyped value {other} refused for experiences.{column}");
            Err(StoreError::TypeMismatch(format!(
                "experiences.{column} got untyped JSON value {other}; \
                 request bodies do not carry dates"
            )))
        }
    }
}

fn profile_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Profile {id} not found"))
}

fn experience_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Experience {id} not found"))
}

/// GET /api/profiles
pub async fn handle_list_profiles(
    State(state): State<AppState>,
) -> Result<Json<Vec<Profile>>, AppError> {
    Ok(Json(state.store.list_profiles().await?))
}

/// GET /api/profiles/:id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<ProfileDetail>, AppError> {
    let profile = state
        .store
        .get_profile(id)
        .await?
        .ok_or_else(|| profile_not_found(id))?;
    let experiences = state.store.list_experiences(id).await?;
    Ok(Json(ProfileDetail {
        profile,
        experiences,
    }))
}

/// POST /api/profiles
pub async fn handle_create_profile(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateProfileRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let user_id = req
        .user_id
        .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
    let profile = state
        .store
        .create_profile(NewProfile {
            user_id,
            fields: req.fields,
        })
        .await?;
    info!(profile_id = profile.id, user_id, "Profile created");
    Ok(created("Profile created", profile.id))
}

/// PUT /api/profiles/:id
pub async fn handle_update_profile(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(fields): JsonBody<ProfileFields>,
) -> Result<Json<Value>, AppError> {
    state
        .store
        .update_profile(id, fields)
        .await?
        .ok_or_else(|| profile_not_found(id))?;
    Ok(message("Profile updated"))
}

/// DELETE /api/profiles/:id
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Value>, AppError> {
    if !state.store.delete_profile(id).await? {
        return Err(profile_not_found(id));
    }
    Ok(message("Profile deleted"))
}

/// POST /api/profiles/:id/experiences
pub async fn handle_create_experience(
    State(state): State<AppState>,
    PathParam(profile_id): PathParam<i64>,
    JsonBody(req): JsonBody<ExperienceRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if state.store.get_profile(profile_id).await?.is_none() {
        return Err(profile_not_found(profile_id));
    }
    let fields = req.into_fields()?;
    let experience = state.store.create_experience(profile_id, fields).await?;
    Ok(created("Experience added", experience.id))
}

/// PUT /api/profiles/:id/experiences/:exp_id
pub async fn handle_update_experience(
    State(state): State<AppState>,
    PathParam((profile_id, exp_id)): PathParam<(i64, i64)>,
    JsonBody(req): JsonBody<ExperienceRequest>,
) -> Result<Json<Value>, AppError> {
    let exists = state
        .store
        .list_experiences(profile_id)
        .await?
        .iter()
        .any(|e| e.id == exp_id);
    if !exists {
        return Err(experience_not_found(exp_id));
    }
    let fields = req.into_fields()?;
    state
        .store
        .update_experience(profile_id, exp_id, fields)
        .await?
        .ok_or_else(|| experience_not_found(exp_id))?;
    Ok(message("Experience updated"))
}

/// DELETE /api/profiles/:id/experiences/:exp_id
pub async fn handle_delete_experience(
    State(state): State<AppState>,
    PathParam((profile_id, exp_id)): PathParam<(i64, i64)>,
) -> Result<Json<Value>, AppError> {
    if !state.store.delete_experience(profile_id, exp_id).await? {
        return Err(experience_not_found(exp_id));
    }
    Ok(message("Experience deleted"))
}
