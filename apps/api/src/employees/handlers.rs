use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::employees::hiring::{plan_hire, HireRequest};
use crate::errors::AppError;
use crate::http::{created, message, JsonBody, PathParam};
use crate::models::employee::{
    display_name, Employee, EmployeeDetail, EmployeeFields, PerformanceFields,
};
use crate::state::AppState;
use crate::store::{HireAccount, NewEmployee};

fn employee_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Employee {id} not found"))
}

fn performance_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Performance {id} not found"))
}

/// GET /api/employees
pub async fn handle_list_employees(
    State(state): State<AppState>,
) -> Result<Json<Vec<Employee>>, AppError> {
    Ok(Json(state.store.list_employees().await?))
}

/// GET /api/employees/:id
pub async fn handle_get_employee(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<EmployeeDetail>, AppError> {
    let employee = state
        .store
        .get_employee(id)
        .await?
        .ok_or_else(|| employee_not_found(id))?;
    let performances = state.store.list_performances(id).await?;
    Ok(Json(EmployeeDetail {
        employee,
        performances,
    }))
}

/// POST /api/employees
pub async fn handle_create_employee(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<HireRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let account = plan_hire(state.store.as_ref(), &req).await?;
    let promoted = matches!(account, HireAccount::Existing { promote: true, .. });

    let (user, employee) = state
        .store
        .create_employee(NewEmployee {
            account,
            fields: req.fields,
        })
        .await?;

    if promoted {
        info!(user_id = user.id, "Candidate promoted to employee");
    }
    info!(
        employee_id = employee.id,
        user_id = user.id,
        name = %display_name(&user.first_name, &user.last_name),
        "Employee created"
    );
    Ok(created("Employee created", employee.id))
}

/// PUT /api/employees/:id
pub async fn handle_update_employee(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(fields): JsonBody<EmployeeFields>,
) -> Result<Json<Value>, AppError> {
    state
        .store
        .update_employee(id, fields)
        .await?
        .ok_or_else(|| employee_not_found(id))?;
    Ok(message("Employee updated"))
}

/// DELETE /api/employees/:id
pub async fn handle_delete_employee(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Value>, AppError> {
    if !state.store.delete_employee(id).await? {
        return Err(employee_not_found(id));
    }
    info!(employee_id = id, "Employee deleted");
    Ok(message("Employee deleted"))
}

/// POST /api/employees/:id/performances
pub async fn handle_create_performance(
    State(state): State<AppState>,
    PathParam(employee_id): PathParam<i64>,
    JsonBody(fields): JsonBody<PerformanceFields>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if state.store.get_employee(employee_id).await?.is_none() {
        return Err(employee_not_found(employee_id));
    }
    let performance = state.store.create_performance(employee_id, fields).await?;
    Ok(created("Performance added", performance.id))
}

/// PUT /api/employees/:id/performances/:perf_id
pub async fn handle_update_performance(
    State(state): State<AppState>,
    PathParam((employee_id, perf_id)): PathParam<(i64, i64)>,
    JsonBody(fields): JsonBody<PerformanceFields>,
) -> Result<Json<Value>, AppError> {
    state
        .store
        .update_performance(employee_id, perf_id, fields)
        .await?
        .ok_or_else(|| performance_not_found(perf_id))?;
    Ok(message("Performance updated"))
}

/// DELETE /api/employees/:id/performances/:perf_id
pub async fn handle_delete_performance(
    State(state): State<AppState>,
    PathParam((employee_id, perf_id)): PathParam<(i64, i64)>,
) -> Result<Json<Value>, AppError> {
    if !state.store.delete_performance(employee_id, perf_id).await? {
        return Err(performance_not_found(perf_id));
    }
    Ok(message("Performance deleted"))
}
