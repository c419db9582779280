use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::password::hash_password;
use crate::errors::AppError;
use crate::http::{JsonBody, PathParam, QueryParams};
use crate::models::user::{normalize_email, User};
use crate::state::AppState;
use crate::store::{NewUser, PageRequest, StoreError, UserChanges};
use crate::validation::{non_blank, parse_role, Required};

const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct ListUsersParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListUsersParams {
    fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page.unwrap_or(1).max(1),
            per_page: self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Outer `Some` means the key was present, even as `null`.
    #[serde(default, deserialize_with = "present")]
    pub company_name: Option<Option<String>>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn user_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("User {id} not found"))
}

fn email_taken(err: StoreError) -> AppError {
    match err {
        StoreError::Conflict(_) => AppError::Conflict("Email already exists".to_string()),
        other => other.into(),
    }
}

/// Number of pages needed for `total` rows.
fn page_count(total: i64, per_page: u32) -> i64 {
    let per_page = i64::from(per_page.max(1));
    (total + per_page - 1) / per_page
}

/// GET /api/users/health
pub async fn handle_users_health() -> Json<Value> {
    Json(json!({ "status": "users OK" }))
}

/// GET /api/users
pub async fn handle_list_users(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ListUsersParams>,
) -> Result<Json<Value>, AppError> {
    let request = params.page_request();
    let page = state.store.list_users(request).await?;
    Ok(Json(json!({
        "items": page.items,
        "page": request.page,
        "per_page": request.per_page,
        "total": page.total,
        "pages": page_count(page.total, request.per_page),
    })))
}

/// GET /api/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<User>, AppError> {
    let user = state.store.get_user(id).await?.ok_or_else(|| user_not_found(id))?;
    Ok(Json(user))
}

/// POST /api/users
pub async fn handle_create_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let mut required = Required::default();
    let first_name = required.text("first_name", req.first_name.as_deref());
    let last_name = required.text("last_name", req.last_name.as_deref());
    let email = required.text("email", req.email.as_deref());
    let password = required.secret("password", req.password.as_deref());
    required.finish()?;

    let email = normalize_email(&email);
    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let user = state
        .store
        .create_user(NewUser {
            first_name,
            last_name,
            company_name: non_blank(req.company_name),
            email,
            password_hash: Some(hash_password(&password)?),
            role: parse_role(req.role)?,
            phone: None,
        })
        .await
        .map_err(email_taken)?;

    info!(user_id = user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// PATCH /api/users/:id
///
/// Blank strings leave a field unchanged, except `company_name`, which is
/// cleared by a blank or null value.
pub async fn handle_update_user(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    let current = state.store.get_user(id).await?.ok_or_else(|| user_not_found(id))?;

    let email = non_blank(req.email).map(|e| normalize_email(&e));
    if let Some(email) = email.as_deref().filter(|e| *e != current.email) {
        if state.store.find_user_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }
    }

    let password_hash = req
        .password
        .filter(|p| !p.trim().is_empty())
        .map(|p| hash_password(&p))
        .transpose()?;

    let changes = UserChanges {
        first_name: non_blank(req.first_name),
        last_name: non_blank(req.last_name),
        company_name: req.company_name.map(non_blank),
        email,
        password_hash,
        role: non_blank(req.role)
            .map(|role| parse_role(Some(role)))
            .transpose()?,
    };

    let user = state
        .store
        .update_user(id, changes)
        .await
        .map_err(email_taken)?
        .ok_or_else(|| user_not_found(id))?;
    Ok(Json(user))
}

/// DELETE /api/users/:id
pub async fn handle_delete_user(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Value>, AppError> {
    if !state.store.delete_user(id).await? {
        return Err(user_not_found(id));
    }
    info!(user_id = id, "User deleted");
    Ok(Json(json!({ "deleted": true, "id": id })))
}
