//! Production tracking service
//!
//! Orders move through the fixed stage pipeline one step at a time. Each
//! move writes an append-only `production_logs` row. Operators record work
//! sessions as production entries; a supervisor's approval of a completed
//! entry advances the order into the entry's stage.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{EntryQuantities, EntryStatus, MachineStatus, OrderStatus, ProductionStage, StageError};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use super::order::parse_status;
use crate::error::{AppError, AppResult};

/// Production service
#[derive(Clone)]
pub struct ProductionService {
    db: PgPool,
}

/// Immutable record of one stage transition
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductionLog {
    pub id: Uuid,
    pub order_id: Uuid,
    pub from_stage: String,
    pub to_stage: String,
    pub entry_id: Option<Uuid>,
    pub changed_by: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductionEntry {
    pub id: Uuid,
    pub order_id: Uuid,
    pub stage: String,
    pub machine_id: Option<Uuid>,
    pub operator_id: Option<Uuid>,
    pub status: String,
    pub input_quantity: i32,
    pub output_quantity: i32,
    pub rejected_quantity: i32,
    pub wastage_quantity: i32,
    pub wastage_percent: Option<Decimal>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Machine {
    pub id: Uuid,
    pub branch_id: Option<Uuid>,
    pub name: String,
    pub code: String,
    pub machine_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order position in the pipeline
#[derive(Debug, Clone, Serialize)]
pub struct StageProgress {
    pub order_id: Uuid,
    pub status: String,
    pub current_stage: ProductionStage,
    pub next_stage: Option<ProductionStage>,
    pub logs: Vec<ProductionLog>,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceStageInput {
    pub to_stage: ProductionStage,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StartEntryInput {
    pub order_id: Uuid,
    pub stage: ProductionStage,
    pub machine_id: Option<Uuid>,
    pub operator_id: Option<Uuid>,
    pub input_quantity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteEntryInput {
    pub output_quantity: i32,
    #[serde(default)]
    pub rejected_quantity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryInput {
    pub input_quantity: Option<i32>,
    pub output_quantity: Option<i32>,
    pub rejected_quantity: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectEntryInput {
    pub reason: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntryFilter {
    pub order_id: Option<Uuid>,
    pub status: Option<EntryStatus>,
    pub stage: Option<ProductionStage>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MachineInput {
    #[validate(length(min = 1, max = 120, message = "Machine name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "Machine code is required"))]
    pub code: String,
    #[validate(length(min = 1, max = 60, message = "Machine type is required"))]
    pub machine_type: String,
    pub branch_id: Option<Uuid>,
    pub status: Option<MachineStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MachineFilter {
    pub status: Option<MachineStatus>,
    pub branch_id: Option<Uuid>,
}

#[derive(Debug, FromRow)]
struct OrderStageRow {
    id: Uuid,
    order_number: String,
    status: String,
    current_stage: String,
}

const ENTRY_COLUMNS: &str = "id, order_id, stage, machine_id, operator_id, status, input_quantity, \
     output_quantity, rejected_quantity, wastage_quantity, wastage_percent, start_time, end_time, \
     notes, created_by, approved_by, approved_at, rejection_reason, created_at, updated_at";

const MACHINE_COLUMNS: &str =
    "id, branch_id, name, code, machine_type, status, created_at, updated_at";

const LOG_COLUMNS: &str = "id, order_id, from_stage, to_stage, entry_id, changed_by, notes, created_at";

impl ProductionService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ========================================================================
    // Stage progression
    // ========================================================================

    /// Move an order exactly one stage forward
    pub async fn advance_stage(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        input: AdvanceStageInput,
    ) -> AppResult<ProductionLog> {
        let mut tx = self.db.begin().await?;

        let order = lock_order(&mut tx, order_id).await?;
        let log = advance_locked(&mut tx, &order, input.to_stage, user_id, input.notes, None).await?;

        tx.commit().await?;
        Ok(log)
    }

    /// Current stage and transition history of an order
    pub async fn stage_progress(&self, order_id: Uuid) -> AppResult<StageProgress> {
        let order = sqlx::query_as::<_, OrderStageRow>(
            "SELECT id, order_number, status, current_stage FROM orders WHERE id = $1",
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

        let current_stage = parse_stage(&order.current_stage)?;
        let logs = self.list_logs(order_id).await?;

        Ok(StageProgress {
            order_id: order.id,
            status: order.status,
            current_stage,
            next_stage: current_stage.next(),
            logs,
        })
    }

    /// Stage transitions of an order, oldest first
    pub async fn list_logs(&self, order_id: Uuid) -> AppResult<Vec<ProductionLog>> {
        let logs = sqlx::query_as::<_, ProductionLog>(&format!(
            "SELECT {LOG_COLUMNS} FROM production_logs WHERE order_id = $1 ORDER BY created_at, id"
        ))
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(logs)
    }

    // ========================================================================
    // Production entries
    // ========================================================================

    /// Open a work session on the order's next stage
    pub async fn start_entry(&self, user_id: Uuid, input: StartEntryInput) -> AppResult<ProductionEntry> {
        if input.input_quantity <= 0 {
            return Err(shared::QuantityError::NonPositiveInput.into());
        }
        if !input.stage.is_work_stage() {
            return Err(AppError::validation(
                "stage",
                format!("{} is not a production work stage", input.stage),
            ));
        }

        let mut tx = self.db.begin().await?;

        let order = lock_order(&mut tx, input.order_id).await?;
        let status = parse_status(&order.status)?;
        let current = parse_stage(&order.current_stage)?;
        if !status.accepts_production() || current.is_completed() {
            return Err(AppError::InvalidStateTransition(format!(
                "Order {} is {} and cannot take production entries",
                order.order_number, order.status
            )));
        }
        if current.next() != Some(input.stage) {
            return Err(StageError::Skip {
                from: current,
                to: input.stage,
                expected: current.next().unwrap_or(ProductionStage::Completed),
            }
            .into());
        }

        if let Some(operator_id) = input.operator_id {
            let active = sqlx::query_scalar::<_, bool>("SELECT is_active FROM employees WHERE id = $1")
                .bind(operator_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::validation("operator_id", "Operator does not exist"))?;
            if !active {
                return Err(AppError::validation("operator_id", "Operator is not active"));
            }
        }

        if let Some(machine_id) = input.machine_id {
            claim_machine(&mut tx, machine_id).await?;
        }

        let entry = sqlx::query_as::<_, ProductionEntry>(&format!(
            r#"
            INSERT INTO production_entries
                (order_id, stage, machine_id, operator_id, status, input_quantity, start_time, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), $7, $8)
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(order.id)
        .bind(input.stage.as_str())
        .bind(input.machine_id)
        .bind(input.operator_id)
        .bind(EntryStatus::InProgress.as_str())
        .bind(input.input_quantity)
        .bind(&input.notes)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(entry_id = %entry.id, order_id = %entry.order_id, stage = %entry.stage, "Production entry started");
        Ok(entry)
    }

    /// Close a work session with its output counts
    pub async fn complete_entry(&self, entry_id: Uuid, input: CompleteEntryInput) -> AppResult<ProductionEntry> {
        let mut tx = self.db.begin().await?;

        let entry = lock_entry(&mut tx, entry_id).await?;
        expect_status(&entry, EntryStatus::InProgress, "completed")?;

        let quantities = EntryQuantities::new(
            entry.input_quantity,
            input.output_quantity,
            input.rejected_quantity,
        );
        quantities.validate()?;

        let entry = sqlx::query_as::<_, ProductionEntry>(&format!(
            r#"
            UPDATE production_entries
            SET status = $2, output_quantity = $3, rejected_quantity = $4,
                wastage_quantity = $5, wastage_percent = $6, end_time = NOW(),
                notes = COALESCE($7, notes)
            WHERE id = $1
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(entry_id)
        .bind(EntryStatus::Completed.as_str())
        .bind(quantities.output)
        .bind(quantities.rejected)
        .bind(quantities.wastage())
        .bind(quantities.wastage_percent())
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(machine_id) = entry.machine_id {
            release_machine(&mut tx, machine_id).await?;
        }

        tx.commit().await?;

        tracing::info!(
            entry_id = %entry.id,
            output = entry.output_quantity,
            rejected = entry.rejected_quantity,
            "Production entry completed"
        );
        Ok(entry)
    }

    /// Sign off a completed entry and advance the order into its stage
    pub async fn approve_entry(&self, approver_id: Uuid, entry_id: Uuid) -> AppResult<ProductionEntry> {
        let mut tx = self.db.begin().await?;

        let entry = lock_entry(&mut tx, entry_id).await?;
        expect_status(&entry, EntryStatus::Completed, "approved")?;
        let stage = parse_stage(&entry.stage)?;

        let entry = sqlx::query_as::<_, ProductionEntry>(&format!(
            r#"
            UPDATE production_entries
            SET status = $2, approved_by = $3, approved_at = NOW()
            WHERE id = $1
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(entry_id)
        .bind(EntryStatus::Approved.as_str())
        .bind(approver_id)
        .fetch_one(&mut *tx)
        .await?;

        let order = lock_order(&mut tx, entry.order_id).await?;
        let status = parse_status(&order.status)?;
        let current = parse_stage(&order.current_stage)?;

        if !status.accepts_production() {
            tracing::info!(entry_id = %entry.id, order_status = %status, "Entry approved; order no longer in production");
        } else {
            match current.validate_transition(stage) {
                Ok(()) => {
                    advance_locked(
                        &mut tx,
                        &order,
                        stage,
                        approver_id,
                        Some(format!("Approved production entry {}", entry.id)),
                        Some(entry.id),
                    )
                    .await?;
                }
                // Order already reached this stage through another entry or a manual advance
                Err(StageError::SameStage(_)) | Err(StageError::Regression { .. }) | Err(StageError::AlreadyCompleted) => {
                    tracing::info!(entry_id = %entry.id, current = %current, "Entry approved; order already past its stage");
                }
                Err(err) => return Err(err.into()),
            }
        }

        tx.commit().await?;

        tracing::info!(entry_id = %entry.id, approver_id = %approver_id, "Production entry approved");
        Ok(entry)
    }

    /// Send a completed entry back without advancing the order
    pub async fn reject_entry(
        &self,
        approver_id: Uuid,
        entry_id: Uuid,
        input: RejectEntryInput,
    ) -> AppResult<ProductionEntry> {
        let reason = input.reason.trim();
        if reason.is_empty() {
            return Err(AppError::validation("reason", "Rejection reason is required"));
        }

        let mut tx = self.db.begin().await?;

        let entry = lock_entry(&mut tx, entry_id).await?;
        expect_status(&entry, EntryStatus::Completed, "rejected")?;

        let entry = sqlx::query_as::<_, ProductionEntry>(&format!(
            r#"
            UPDATE production_entries
            SET status = $2, approved_by = $3, approved_at = NOW(), rejection_reason = $4
            WHERE id = $1
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(entry_id)
        .bind(EntryStatus::Rejected.as_str())
        .bind(approver_id)
        .bind(reason)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(entry_id = %entry.id, "Production entry rejected");
        Ok(entry)
    }

    /// Correct the quantities of an entry that has not been signed off
    pub async fn update_entry(&self, entry_id: Uuid, input: UpdateEntryInput) -> AppResult<ProductionEntry> {
        let mut tx = self.db.begin().await?;

        let entry = lock_entry(&mut tx, entry_id).await?;
        let status = parse_entry_status(&entry.status)?;
        if !status.is_editable() {
            return Err(AppError::InvalidStateTransition(format!(
                "Production entry is {} and can no longer be edited",
                entry.status
            )));
        }

        let quantities = EntryQuantities::new(
            input.input_quantity.unwrap_or(entry.input_quantity),
            input.output_quantity.unwrap_or(entry.output_quantity),
            input.rejected_quantity.unwrap_or(entry.rejected_quantity),
        );
        quantities.validate()?;

        // Wastage is only meaningful once output has been recorded
        let (wastage, wastage_percent) = match status {
            EntryStatus::InProgress => (0, None),
            _ => (quantities.wastage(), Some(quantities.wastage_percent())),
        };

        let entry = sqlx::query_as::<_, ProductionEntry>(&format!(
            r#"
            UPDATE production_entries
            SET input_quantity = $2, output_quantity = $3, rejected_quantity = $4,
                wastage_quantity = $5, wastage_percent = $6, notes = COALESCE($7, notes)
            WHERE id = $1
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(entry_id)
        .bind(quantities.input)
        .bind(quantities.output)
        .bind(quantities.rejected)
        .bind(wastage)
        .bind(wastage_percent)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(entry)
    }

    pub async fn get_entry(&self, entry_id: Uuid) -> AppResult<ProductionEntry> {
        sqlx::query_as::<_, ProductionEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM production_entries WHERE id = $1"
        ))
        .bind(entry_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Production entry"))
    }

    pub async fn list_entries(&self, filter: EntryFilter) -> AppResult<Vec<ProductionEntry>> {
        let entries = sqlx::query_as::<_, ProductionEntry>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM production_entries
            WHERE ($1::uuid IS NULL OR order_id = $1)
              AND ($2::varchar IS NULL OR status = $2)
              AND ($3::varchar IS NULL OR stage = $3)
            ORDER BY start_time DESC
            "#
        ))
        .bind(filter.order_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.stage.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    // ========================================================================
    // Machines
    // ========================================================================

    pub async fn list_machines(&self, filter: MachineFilter) -> AppResult<Vec<Machine>> {
        let machines = sqlx::query_as::<_, Machine>(&format!(
            r#"
            SELECT {MACHINE_COLUMNS}
            FROM machines
            WHERE ($1::varchar IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR branch_id = $2)
            ORDER BY code
            "#
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.branch_id)
        .fetch_all(&self.db)
        .await?;

        Ok(machines)
    }

    pub async fn get_machine(&self, id: Uuid) -> AppResult<Machine> {
        sqlx::query_as::<_, Machine>(&format!("SELECT {MACHINE_COLUMNS} FROM machines WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Machine"))
    }

    pub async fn create_machine(&self, input: MachineInput) -> AppResult<Machine> {
        input.validate()?;
        let status = manual_machine_status(input.status)?.unwrap_or(MachineStatus::Active);

        let machine = sqlx::query_as::<_, Machine>(&format!(
            r#"
            INSERT INTO machines (branch_id, name, code, machine_type, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MACHINE_COLUMNS}
            "#
        ))
        .bind(input.branch_id)
        .bind(input.name.trim())
        .bind(input.code.trim().to_uppercase())
        .bind(input.machine_type.trim())
        .bind(status.as_str())
        .fetch_one(&self.db)
        .await?;

        tracing::info!(machine_id = %machine.id, code = %machine.code, "Machine created");
        Ok(machine)
    }

    /// Edit a machine. A machine in use keeps its status until its entry completes.
    pub async fn update_machine(&self, id: Uuid, input: MachineInput) -> AppResult<Machine> {
        input.validate()?;
        let status = manual_machine_status(input.status)?;

        let current = self.get_machine(id).await?;
        let in_use = MachineStatus::parse(&current.status) == Some(MachineStatus::InUse);
        if status.is_some() && in_use {
            return Err(AppError::InvalidStateTransition(
                "Machine is in use; complete its production entry first".to_string(),
            ));
        }

        sqlx::query_as::<_, Machine>(&format!(
            r#"
            UPDATE machines
            SET branch_id = $2, name = $3, code = $4, machine_type = $5,
                status = COALESCE($6, status)
            WHERE id = $1
            RETURNING {MACHINE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.branch_id)
        .bind(input.name.trim())
        .bind(input.code.trim().to_uppercase())
        .bind(input.machine_type.trim())
        .bind(status.map(|s| s.as_str()))
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Machine"))
    }

    pub async fn delete_machine(&self, id: Uuid) -> AppResult<()> {
        let machine = self.get_machine(id).await?;
        if MachineStatus::parse(&machine.status) == Some(MachineStatus::InUse) {
            return Err(AppError::conflict("machine", "Machine is in use and cannot be deleted"));
        }

        let referenced = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM production_entries WHERE machine_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;
        if referenced {
            return Err(AppError::conflict(
                "machine",
                "Machine has production history; set it INACTIVE instead",
            ));
        }

        sqlx::query("DELETE FROM machines WHERE id = $1 AND status <> 'IN_USE'")
            .bind(id)
            .execute(&self.db)
            .await?;

        tracing::info!(machine_id = %id, "Machine deleted");
        Ok(())
    }
}

async fn lock_order(conn: &mut PgConnection, order_id: Uuid) -> AppResult<OrderStageRow> {
    sqlx::query_as::<_, OrderStageRow>(
        "SELECT id, order_number, status, current_stage FROM orders WHERE id = $1 FOR UPDATE",
    )
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found("Order"))
}

async fn lock_entry(conn: &mut PgConnection, entry_id: Uuid) -> AppResult<ProductionEntry> {
    sqlx::query_as::<_, ProductionEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM production_entries WHERE id = $1 FOR UPDATE"
    ))
    .bind(entry_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found("Production entry"))
}

/// Apply a one-step transition to a locked order and log it
async fn advance_locked(
    conn: &mut PgConnection,
    order: &OrderStageRow,
    to: ProductionStage,
    user_id: Uuid,
    notes: Option<String>,
    entry_id: Option<Uuid>,
) -> AppResult<ProductionLog> {
    let status = parse_status(&order.status)?;
    if !status.accepts_production() {
        return Err(AppError::InvalidStateTransition(format!(
            "Order {} is {} and cannot advance",
            order.order_number, status
        )));
    }

    let from = parse_stage(&order.current_stage)?;
    from.validate_transition(to)?;
    let new_status = OrderStatus::for_stage(to);

    sqlx::query("UPDATE orders SET current_stage = $2, status = $3 WHERE id = $1")
        .bind(order.id)
        .bind(to.as_str())
        .bind(new_status.as_str())
        .execute(&mut *conn)
        .await?;

    let log = sqlx::query_as::<_, ProductionLog>(&format!(
        r#"
        INSERT INTO production_logs (order_id, from_stage, to_stage, entry_id, changed_by, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {LOG_COLUMNS}
        "#
    ))
    .bind(order.id)
    .bind(from.as_str())
    .bind(to.as_str())
    .bind(entry_id)
    .bind(user_id)
    .bind(&notes)
    .fetch_one(&mut *conn)
    .await?;

    tracing::info!(
        order_id = %order.id,
        order_number = %order.order_number,
        from = %from,
        to = %to,
        "Order advanced to next stage"
    );
    Ok(log)
}

/// Move an available machine to IN_USE; fails if another session holds it
async fn claim_machine(conn: &mut PgConnection, machine_id: Uuid) -> AppResult<()> {
    let claimed = sqlx::query("UPDATE machines SET status = $2 WHERE id = $1 AND status = $3")
        .bind(machine_id)
        .bind(MachineStatus::InUse.as_str())
        .bind(MachineStatus::Active.as_str())
        .execute(&mut *conn)
        .await?;

    if claimed.rows_affected() == 0 {
        let status = sqlx::query_scalar::<_, String>("SELECT status FROM machines WHERE id = $1")
            .bind(machine_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::validation("machine_id", "Machine does not exist"))?;
        return Err(AppError::InvalidStateTransition(format!(
            "Machine is {} and not available",
            status
        )));
    }
    Ok(())
}

async fn release_machine(conn: &mut PgConnection, machine_id: Uuid) -> AppResult<()> {
    sqlx::query("UPDATE machines SET status = $2 WHERE id = $1 AND status = $3")
        .bind(machine_id)
        .bind(MachineStatus::Active.as_str())
        .bind(MachineStatus::InUse.as_str())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

fn expect_status(entry: &ProductionEntry, expected: EntryStatus, action: &str) -> AppResult<()> {
    if entry.status == expected.as_str() {
        Ok(())
    } else {
        Err(AppError::InvalidStateTransition(format!(
            "Only {} entries can be {}; entry is {}",
            expected.as_str(),
            action,
            entry.status
        )))
    }
}

/// IN_USE is owned by production entries and cannot be set by hand
fn manual_machine_status(status: Option<MachineStatus>) -> AppResult<Option<MachineStatus>> {
    match status {
        Some(MachineStatus::InUse) => Err(AppError::validation(
            "status",
            "IN_USE is set automatically when a production entry starts",
        )),
        other => Ok(other),
    }
}

fn parse_stage(stage: &str) -> AppResult<ProductionStage> {
    stage
        .parse::<ProductionStage>()
        .map_err(|e| AppError::Internal(e.to_string()))
}

fn parse_entry_status(status: &str) -> AppResult<EntryStatus> {
    EntryStatus::parse(status)
        .ok_or_else(|| AppError::Internal(format!("Unknown entry status {}", status)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_use_cannot_be_set_manually() {
        assert!(manual_machine_status(Some(MachineStatus::InUse)).is_err());
        assert_eq!(
            manual_machine_status(Some(MachineStatus::Maintenance)).unwrap(),
            Some(MachineStatus::Maintenance)
        );
        assert_eq!(manual_machine_status(None).unwrap(), None);
    }

    #[test]
    fn test_parse_stage_from_db() {
        assert_eq!(parse_stage("WELDING_OUTER").unwrap(), ProductionStage::WeldingOuter);
        assert!(parse_stage("POLISHING").is_err());
    }
}
