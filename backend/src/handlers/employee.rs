//! Employee and attendance HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{Action, Resource};
use uuid::Uuid;

use super::BranchQuery;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::employee::{
    Attendance, AttendanceFilter, CheckInput, Employee, EmployeeInput, MarkAttendanceInput,
};
use crate::services::EmployeeService;
use crate::AppState;

pub async fn list_employees(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<BranchQuery>,
) -> AppResult<Json<Vec<Employee>>> {
    user.require(Resource::Employee, Action::View)?;
    let employees = EmployeeService::new(state.db.clone())
        .list_employees(query.branch_id)
        .await?;
    Ok(Json(employees))
}

pub async fn get_employee(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<Employee>> {
    user.require(Resource::Employee, Action::View)?;
    let employee = EmployeeService::new(state.db.clone()).get_employee(employee_id).await?;
    Ok(Json(employee))
}

pub async fn create_employee(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<EmployeeInput>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    user.require(Resource::Employee, Action::Create)?;
    let employee = EmployeeService::new(state.db.clone()).create_employee(input).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn update_employee(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(employee_id): Path<Uuid>,
    Json(input): Json<EmployeeInput>,
) -> AppResult<Json<Employee>> {
    user.require(Resource::Employee, Action::Edit)?;
    let employee = EmployeeService::new(state.db.clone())
        .update_employee(employee_id, input)
        .await?;
    Ok(Json(employee))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(employee_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require(Resource::Employee, Action::Delete)?;
    EmployeeService::new(state.db.clone()).delete_employee(employee_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn check_in(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(employee_id): Path<Uuid>,
    Json(input): Json<CheckInput>,
) -> AppResult<(StatusCode, Json<Attendance>)> {
    user.require(Resource::Attendance, Action::Create)?;
    let record = EmployeeService::new(state.db.clone()).check_in(employee_id, input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn check_out(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(employee_id): Path<Uuid>,
    Json(input): Json<CheckInput>,
) -> AppResult<Json<Attendance>> {
    user.require(Resource::Attendance, Action::Edit)?;
    let record = EmployeeService::new(state.db.clone()).check_out(employee_id, input).await?;
    Ok(Json(record))
}

/// Record a status for a day without clock times
pub async fn mark_attendance(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(employee_id): Path<Uuid>,
    Json(input): Json<MarkAttendanceInput>,
) -> AppResult<Json<Attendance>> {
    user.require(Resource::Attendance, Action::Edit)?;
    let record = EmployeeService::new(state.db.clone())
        .mark_attendance(employee_id, input)
        .await?;
    Ok(Json(record))
}

pub async fn list_attendance(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<AttendanceFilter>,
) -> AppResult<Json<Vec<Attendance>>> {
    user.require(Resource::Attendance, Action::View)?;
    let records = EmployeeService::new(state.db.clone()).list_attendance(filter).await?;
    Ok(Json(records))
}
