use axum::{
    extract::{FromRequest, FromRequestParts},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::errors::AppError;

/// `Json` extractor whose rejection is an [`AppError`], so malformed bodies
/// produce the same 400 error shape as every other validation failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// `Path` extractor whose rejection is an [`AppError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);

/// `Query` extractor whose rejection is an [`AppError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// `{"message": ...}` acknowledgement for updates and deletes.
pub fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

/// 201 acknowledgement carrying the new record's id.
pub fn created(text: &str, id: i64) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(json!({ "message": text, "id": id })))
}
