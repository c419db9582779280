use axum::{
    extract::State,
    http::StatusCode,
    response::Redirect,
    Json,
};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::auth::oauth::{role_for_state, GoogleIdentity};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::http::{JsonBody, QueryParams};
use crate::models::user::{normalize_email, public_handle, CandidateSummary, User};
use crate::state::AppState;
use crate::store::{NewUser, StoreError};
use crate::validation::{non_blank, parse_role, Required};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
}

impl RegisterRequest {
    fn is_empty(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.company_name,
            &self.email,
            &self.role,
            &self.password,
            &self.phone,
        ]
        .iter()
        .all(|field| field.is_none())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleLoginParams {
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /api/auth/ping
pub async fn handle_ping() -> Json<Value> {
    Json(json!({ "msg": "auth ok" }))
}

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if req.is_empty() {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }
    let phone = non_blank(req.phone)
        .ok_or_else(|| AppError::Validation("Phone number is required".to_string()))?;

    let mut required = Required::default();
    let first_name = required.text("firstName", req.first_name.as_deref());
    let email = required.text("email", req.email.as_deref());
    let password = required.secret("password", req.password.as_deref());
    required.finish()?;

    let role = parse_role(req.role)?;
    let email = normalize_email(&email);

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Validation("Email already exists".to_string()));
    }

    let new_user = NewUser {
        first_name,
        last_name: non_blank(req.last_name).unwrap_or_default(),
        company_name: non_blank(req.company_name),
        email,
        password_hash: Some(hash_password(&password)?),
        role,
        phone: Some(phone.clone()),
    };
    let user = state.store.create_user(new_user).await.map_err(|e| match e {
        // Lost a race with a concurrent registration.
        StoreError::Conflict(_) => AppError::Validation("Email already exists".to_string()),
        other => other.into(),
    })?;

    info!(user_id = user.id, role = %user.role, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user_id": public_handle(&user.first_name, Some(&phone)),
        })),
    ))
}

/// POST /api/auth/login
///
/// Every failure, including a missing or unreadable body, is a 401.
pub async fn handle_login(
    State(state): State<AppState>,
    body: Option<Json<LoginRequest>>,
) -> Result<Json<Value>, AppError> {
    let Some(Json(req)) = body else {
        return Err(AppError::InvalidCredentials);
    };
    let (Some(email), Some(password)) = (non_blank(req.email), req.password) else {
        return Err(AppError::InvalidCredentials);
    };

    let user = state
        .store
        .find_user_by_email(&normalize_email(&email))
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let verified = user
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(&password, hash));
    if !verified {
        warn!(user_id = user.id, "Failed login attempt");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.id, user.role)?;
    let phone = state.store.user_phone(user.id).await?;

    info!(user_id = user.id, "User logged in");

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "role": user.role,
        "user_id": public_handle(&user.first_name, phone.as_deref()),
        "id": user.id,
    })))
}

/// GET /api/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<User>, AppError> {
    debug!(user_id = auth.user_id, role = %auth.role, "Resolving current user");
    let user = state
        .store
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

/// GET /api/auth/users/basic
pub async fn handle_users_basic(
    State(state): State<AppState>,
) -> Result<Json<Vec<CandidateSummary>>, AppError> {
    Ok(Json(state.store.list_candidates().await?))
}

/// GET /api/auth/google-login
pub async fn handle_google_login(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<GoogleLoginParams>,
) -> Result<Redirect, AppError> {
    let oauth = state.oauth.as_ref().ok_or_else(oauth_unconfigured)?;
    let role_hint = non_blank(params.role).unwrap_or_else(|| "candidate".to_string());
    let url = oauth
        .authorize_url(&role_hint)
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(Redirect::to(url.as_str()))
}

/// GET /api/auth/google/callback
pub async fn handle_google_callback(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<GoogleCallbackParams>,
) -> Result<Redirect, AppError> {
    let oauth = state.oauth.as_ref().ok_or_else(oauth_unconfigured)?;

    if let Some(error) = params.error {
        warn!("Google sign-in was declined: {error}");
        return Err(AppError::InvalidCredentials);
    }
    let code = non_blank(params.code).ok_or(AppError::InvalidCredentials)?;

    let identity = oauth.exchange_code(&code).await.map_err(|e| {
        warn!("Google code exchange failed: {e}");
        AppError::InvalidCredentials
    })?;

    let user = find_or_create_google_user(&state, identity, params.state.as_deref()).await?;
    let token = state.tokens.issue(user.id, user.role)?;

    let landing = format!(
        "{}/oauth/callback",
        state.config.frontend_url.trim_end_matches('/')
    );
    let url = Url::parse_with_params(&landing, &[("token", token.as_str()), ("role", user.role.as_str())])
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid FRONTEND_URL: {e}")))?;

    info!(user_id = user.id, "User logged in with Google");
    Ok(Redirect::to(url.as_str()))
}

fn oauth_unconfigured() -> AppError {
    AppError::Unavailable("Google login is not configured".to_string())
}

async fn find_or_create_google_user(
    state: &AppState,
    identity: GoogleIdentity,
    role_hint: Option<&str>,
) -> Result<User, AppError> {
    let email = normalize_email(identity.email.as_deref().unwrap_or_default());
    if let Some(existing) = state.store.find_user_by_email(&email).await? {
        return Ok(existing);
    }

    let first_name = non_blank(identity.given_name).unwrap_or_else(|| {
        email.split('@').next().unwrap_or_default().to_string()
    });
    let new_user = NewUser {
        first_name,
        last_name: non_blank(identity.family_name).unwrap_or_default(),
        company_name: None,
        email,
        password_hash: None,
        role: role_for_state(role_hint),
        phone: None,
    };
    let user = state.store.create_user(new_user).await?;
    info!(user_id = user.id, role = %user.role, "Account created from Google sign-in");
    Ok(user)
}
