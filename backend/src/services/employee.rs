//! Employee records and daily attendance

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{hours_worked, AttendanceStatus};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use super::accounting::check_range;
use super::indian_phone;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct EmployeeService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Employee {
    pub id: Uuid,
    pub branch_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub designation: String,
    pub phone: Option<String>,
    pub daily_wage: Decimal,
    pub joined_on: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmployeeInput {
    #[validate(length(min = 1, max = 120, message = "Employee name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 80, message = "Designation is required"))]
    pub designation: String,
    pub branch_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    #[validate(custom = "indian_phone")]
    pub phone: Option<String>,
    pub daily_wage: Decimal,
    pub joined_on: Option<NaiveDate>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Attendance {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub attendance_date: NaiveDate,
    pub status: String,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub hours_worked: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CheckInput {
    pub date: Option<NaiveDate>,
    /// Defaults to now
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct MarkAttendanceInput {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AttendanceFilter {
    pub employee_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

const EMPLOYEE_COLUMNS: &str = "id, branch_id, user_id, name, designation, phone, daily_wage, \
     joined_on, is_active, created_at, updated_at";

const ATTENDANCE_COLUMNS: &str = "id, employee_id, attendance_date, status, check_in, check_out, \
     hours_worked, notes, created_at, updated_at";

impl EmployeeService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_employees(&self, branch_id: Option<Uuid>) -> AppResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(&format!(
            r#"
            SELECT {EMPLOYEE_COLUMNS}
            FROM employees
            WHERE ($1::uuid IS NULL OR branch_id = $1)
            ORDER BY name
            "#
        ))
        .bind(branch_id)
        .fetch_all(&self.db)
        .await?;

        Ok(employees)
    }

    pub async fn get_employee(&self, id: Uuid) -> AppResult<Employee> {
        sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Employee"))
    }

    pub async fn create_employee(&self, input: EmployeeInput) -> AppResult<Employee> {
        input.validate()?;
        validate_wage(input.daily_wage)?;

        let employee = sqlx::query_as::<_, Employee>(&format!(
            r#"
            INSERT INTO employees (branch_id, user_id, name, designation, phone, daily_wage, joined_on, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, CURRENT_DATE), $8)
            RETURNING {EMPLOYEE_COLUMNS}
            "#
        ))
        .bind(input.branch_id)
        .bind(input.user_id)
        .bind(input.name.trim())
        .bind(input.designation.trim())
        .bind(&input.phone)
        .bind(input.daily_wage)
        .bind(input.joined_on)
        .bind(input.is_active)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(employee_id = %employee.id, "Employee created");
        Ok(employee)
    }

    pub async fn update_employee(&self, id: Uuid, input: EmployeeInput) -> AppResult<Employee> {
        input.validate()?;
        validate_wage(input.daily_wage)?;

        sqlx::query_as::<_, Employee>(&format!(
            r#"
            UPDATE employees
            SET branch_id = $2, user_id = $3, name = $4, designation = $5, phone = $6,
                daily_wage = $7, joined_on = COALESCE($8, joined_on), is_active = $9
            WHERE id = $1
            RETURNING {EMPLOYEE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.branch_id)
        .bind(input.user_id)
        .bind(input.name.trim())
        .bind(input.designation.trim())
        .bind(&input.phone)
        .bind(input.daily_wage)
        .bind(input.joined_on)
        .bind(input.is_active)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Employee"))
    }

    /// Delete an employee with no production history; others should be deactivated
    pub async fn delete_employee(&self, id: Uuid) -> AppResult<()> {
        let has_entries = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM production_entries WHERE operator_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if has_entries {
            return Err(AppError::conflict(
                "employee",
                "Employee has production entries; deactivate instead",
            ));
        }

        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Employee"));
        }

        Ok(())
    }

    // ========================================================================
    // Attendance
    // ========================================================================

    /// Record arrival; at most one attendance row per employee and day
    pub async fn check_in(&self, employee_id: Uuid, input: CheckInput) -> AppResult<Attendance> {
        let employee = self.get_employee(employee_id).await?;
        if !employee.is_active {
            return Err(AppError::validation("employee_id", "Employee is not active"));
        }

        let at = input.at.unwrap_or_else(Utc::now);
        let date = input.date.unwrap_or_else(|| at.date_naive());

        let record = sqlx::query_as::<_, Attendance>(&format!(
            r#"
            INSERT INTO attendance (employee_id, attendance_date, status, check_in)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (employee_id, attendance_date) DO NOTHING
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        ))
        .bind(employee_id)
        .bind(date)
        .bind(AttendanceStatus::Present.as_str())
        .bind(at)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| {
            AppError::conflict("attendance", format!("Attendance already recorded for {}", date))
        })?;

        tracing::info!(employee_id = %employee_id, date = %date, "Employee checked in");
        Ok(record)
    }

    /// Record departure and compute hours worked
    pub async fn check_out(&self, employee_id: Uuid, input: CheckInput) -> AppResult<Attendance> {
        let at = input.at.unwrap_or_else(Utc::now);
        let date = input.date.unwrap_or_else(|| at.date_naive());

        let (id, check_in, check_out) = sqlx::query_as::<_, (Uuid, Option<DateTime<Utc>>, Option<DateTime<Utc>>)>(
            "SELECT id, check_in, check_out FROM attendance WHERE employee_id = $1 AND attendance_date = $2",
        )
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::InvalidStateTransition(format!("No check-in recorded for {}", date)))?;

        let check_in = check_in.ok_or_else(|| {
            AppError::InvalidStateTransition(format!("No check-in recorded for {}", date))
        })?;
        if check_out.is_some() {
            return Err(AppError::conflict("attendance", "Already checked out"));
        }

        let hours = hours_worked(check_in, at)?;

        let record = sqlx::query_as::<_, Attendance>(&format!(
            r#"
            UPDATE attendance
            SET check_out = $2, hours_worked = $3
            WHERE id = $1 AND check_out IS NULL
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(at)
        .bind(hours)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::conflict("attendance", "Already checked out"))?;

        tracing::info!(employee_id = %employee_id, hours = %hours, "Employee checked out");
        Ok(record)
    }

    /// Set the day's status directly (absence, leave, half day corrections)
    pub async fn mark_attendance(
        &self,
        employee_id: Uuid,
        input: MarkAttendanceInput,
    ) -> AppResult<Attendance> {
        self.get_employee(employee_id).await?;

        let record = sqlx::query_as::<_, Attendance>(&format!(
            r#"
            INSERT INTO attendance (employee_id, attendance_date, status, notes)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (employee_id, attendance_date)
            DO UPDATE SET status = EXCLUDED.status, notes = COALESCE(EXCLUDED.notes, attendance.notes)
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        ))
        .bind(employee_id)
        .bind(input.date)
        .bind(input.status.as_str())
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(record)
    }

    pub async fn list_attendance(&self, filter: AttendanceFilter) -> AppResult<Vec<Attendance>> {
        check_range(filter.start_date, filter.end_date)?;

        let records = sqlx::query_as::<_, Attendance>(&format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS}
            FROM attendance
            WHERE ($1::uuid IS NULL OR employee_id = $1)
              AND ($2::date IS NULL OR attendance_date >= $2)
              AND ($3::date IS NULL OR attendance_date <= $3)
            ORDER BY attendance_date DESC, employee_id
            "#
        ))
        .bind(filter.employee_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }
}

fn validate_wage(wage: Decimal) -> AppResult<()> {
    shared::validate_money(wage).map_err(|msg| AppError::validation("daily_wage", msg))
}
