//! Accounting ledger: manual entries, system postings and profit & loss

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{round_money, EntryType, ProfitAndLoss, ReferenceType};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Accounting service
#[derive(Clone)]
pub struct AccountingService {
    db: PgPool,
}

/// Ledger entry
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AccountingEntry {
    pub id: Uuid,
    pub entry_type: String,
    pub category: String,
    pub amount: Decimal,
    pub entry_date: NaiveDate,
    pub description: Option<String>,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a manual ledger entry
#[derive(Debug, Deserialize, Validate)]
pub struct ManualEntryInput {
    pub entry_type: EntryType,
    #[validate(length(min = 1, max = 40, message = "Category is required"))]
    pub category: String,
    pub amount: Decimal,
    pub entry_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntryFilter {
    pub entry_type: Option<EntryType>,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Totals per type and category
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryTotal {
    pub entry_type: String,
    pub category: String,
    pub total: Decimal,
    pub entry_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfitAndLossReport {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub totals: ProfitAndLoss,
    pub categories: Vec<CategoryTotal>,
}

const ENTRY_COLUMNS: &str = "id, entry_type, category, amount, entry_date, description, \
     reference_type, reference_id, created_by, created_at, updated_at";

impl AccountingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_entries(&self, filter: EntryFilter) -> AppResult<Vec<AccountingEntry>> {
        check_range(filter.start_date, filter.end_date)?;

        let entries = sqlx::query_as::<_, AccountingEntry>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM accounting_entries
            WHERE ($1::varchar IS NULL OR entry_type = $1)
              AND ($2::varchar IS NULL OR category = $2)
              AND ($3::date IS NULL OR entry_date >= $3)
              AND ($4::date IS NULL OR entry_date <= $4)
            ORDER BY entry_date DESC, created_at DESC
            "#
        ))
        .bind(filter.entry_type.map(|t| t.as_str()))
        .bind(filter.category)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    pub async fn get_entry(&self, id: Uuid) -> AppResult<AccountingEntry> {
        sqlx::query_as::<_, AccountingEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM accounting_entries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Accounting entry"))
    }

    pub async fn create_entry(
        &self,
        user_id: Uuid,
        input: ManualEntryInput,
    ) -> AppResult<AccountingEntry> {
        input.validate()?;
        let amount = positive_amount(input.amount)?;

        let entry = sqlx::query_as::<_, AccountingEntry>(&format!(
            r#"
            INSERT INTO accounting_entries (entry_type, category, amount, entry_date, description, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(input.entry_type.as_str())
        .bind(input.category.trim().to_uppercase())
        .bind(amount)
        .bind(input.entry_date.unwrap_or_else(|| Utc::now().date_naive()))
        .bind(&input.description)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(entry_id = %entry.id, entry_type = %entry.entry_type, amount = %entry.amount, "Manual accounting entry created");
        Ok(entry)
    }

    pub async fn update_entry(&self, id: Uuid, input: ManualEntryInput) -> AppResult<AccountingEntry> {
        input.validate()?;
        let amount = positive_amount(input.amount)?;
        self.ensure_manual(id).await?;

        let entry = sqlx::query_as::<_, AccountingEntry>(&format!(
            r#"
            UPDATE accounting_entries
            SET entry_type = $2, category = $3, amount = $4,
                entry_date = COALESCE($5, entry_date), description = $6
            WHERE id = $1 AND reference_type IS NULL
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.entry_type.as_str())
        .bind(input.category.trim().to_uppercase())
        .bind(amount)
        .bind(input.entry_date)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        Ok(entry)
    }

    pub async fn delete_entry(&self, id: Uuid) -> AppResult<()> {
        self.ensure_manual(id).await?;

        sqlx::query("DELETE FROM accounting_entries WHERE id = $1 AND reference_type IS NULL")
            .bind(id)
            .execute(&self.db)
            .await?;

        tracing::info!(entry_id = %id, "Manual accounting entry deleted");
        Ok(())
    }

    /// Income, expense and net for a period, with a per-category breakdown
    pub async fn profit_and_loss(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> AppResult<ProfitAndLossReport> {
        check_range(start_date, end_date)?;

        let categories = sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT entry_type, category, SUM(amount) AS total, COUNT(*) AS entry_count
            FROM accounting_entries
            WHERE ($1::date IS NULL OR entry_date >= $1)
              AND ($2::date IS NULL OR entry_date <= $2)
            GROUP BY entry_type, category
            ORDER BY entry_type DESC, total DESC
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.db)
        .await?;

        let sum_of = |entry_type: EntryType| -> Decimal {
            categories
                .iter()
                .filter(|c| c.entry_type == entry_type.as_str())
                .map(|c| c.total)
                .sum()
        };

        Ok(ProfitAndLossReport {
            start_date,
            end_date,
            totals: ProfitAndLoss::new(sum_of(EntryType::Income), sum_of(EntryType::Expense)),
            categories,
        })
    }

    async fn ensure_manual(&self, id: Uuid) -> AppResult<()> {
        let reference = sqlx::query_scalar::<_, Option<String>>(
            "SELECT reference_type FROM accounting_entries WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Accounting entry"))?;

        match reference {
            None => Ok(()),
            Some(source) => Err(AppError::conflict(
                "accounting_entry",
                format!("Entry is generated from {} and cannot be edited directly", source),
            )),
        }
    }
}

/// Record the ledger entry owned by a source document
pub async fn post_reference_entry(
    conn: &mut PgConnection,
    reference: ReferenceType,
    reference_id: Uuid,
    amount: Decimal,
    entry_date: NaiveDate,
    description: String,
    created_by: Uuid,
) -> AppResult<()> {
    let amount = round_money(amount);
    // Zero-value documents (fully discounted bills) leave no ledger trace
    if amount <= Decimal::ZERO {
        return Ok(());
    }
    let (entry_type, category) = reference.posting();

    sqlx::query(
        r#"
        INSERT INTO accounting_entries
            (entry_type, category, amount, entry_date, description, reference_type, reference_id, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(entry_type.as_str())
    .bind(category)
    .bind(amount)
    .bind(entry_date)
    .bind(description)
    .bind(reference.as_str())
    .bind(reference_id)
    .bind(created_by)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// What an edit does to the ledger entry of a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LedgerChange {
    Insert(Decimal),
    Update(Decimal),
    Delete,
    Unchanged,
}

/// Zero-value documents own no entry, so an edit across zero inserts or deletes
fn ledger_change(has_entry: bool, amount: Decimal) -> LedgerChange {
    let amount = round_money(amount);
    match (has_entry, amount > Decimal::ZERO) {
        (true, true) => LedgerChange::Update(amount),
        (true, false) => LedgerChange::Delete,
        (false, true) => LedgerChange::Insert(amount),
        (false, false) => LedgerChange::Unchanged,
    }
}

/// Bring the ledger entry owned by an edited source document in line with its new amount
pub async fn restate_reference_entry(
    conn: &mut PgConnection,
    reference: ReferenceType,
    reference_id: Uuid,
    amount: Decimal,
    entry_date: NaiveDate,
    description: String,
    edited_by: Uuid,
) -> AppResult<()> {
    let has_entry = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM accounting_entries WHERE reference_type = $1 AND reference_id = $2)",
    )
    .bind(reference.as_str())
    .bind(reference_id)
    .fetch_one(&mut *conn)
    .await?;

    match ledger_change(has_entry, amount) {
        LedgerChange::Insert(amount) => {
            post_reference_entry(conn, reference, reference_id, amount, entry_date, description, edited_by)
                .await?;
        }
        LedgerChange::Update(amount) => {
            sqlx::query(
                r#"
                UPDATE accounting_entries
                SET amount = $3, entry_date = $4, description = $5, updated_at = NOW()
                WHERE reference_type = $1 AND reference_id = $2
                "#,
            )
            .bind(reference.as_str())
            .bind(reference_id)
            .bind(amount)
            .bind(entry_date)
            .bind(description)
            .execute(&mut *conn)
            .await?;
        }
        LedgerChange::Delete => {
            remove_reference_entries(conn, reference, reference_id).await?;
        }
        LedgerChange::Unchanged => {}
    }

    Ok(())
}

/// Remove the ledger entries owned by a source document
pub async fn remove_reference_entries(
    conn: &mut PgConnection,
    reference: ReferenceType,
    reference_id: Uuid,
) -> AppResult<u64> {
    let result = sqlx::query(
        "DELETE FROM accounting_entries WHERE reference_type = $1 AND reference_id = $2",
    )
    .bind(reference.as_str())
    .bind(reference_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

fn positive_amount(amount: Decimal) -> AppResult<Decimal> {
    let amount = round_money(amount);
    if amount <= Decimal::ZERO {
        return Err(AppError::validation("amount", "Amount must be positive"));
    }
    Ok(amount)
}

/// Reject inverted date filters
pub fn check_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> AppResult<()> {
    if shared::DateRange::from_bounds(start, end).is_valid() {
        Ok(())
    } else {
        Err(AppError::validation("start_date", "Start date must not be after end date"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_amount_rounds_and_rejects_zero() {
        assert_eq!(positive_amount(Decimal::new(10005, 3)).unwrap(), Decimal::new(1001, 2));
        assert!(positive_amount(Decimal::ZERO).is_err());
        assert!(positive_amount(Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn test_ledger_change_across_zero() {
        let priced = Decimal::new(50000, 2);
        assert_eq!(ledger_change(false, priced), LedgerChange::Insert(priced));
        assert_eq!(ledger_change(true, priced), LedgerChange::Update(priced));
        assert_eq!(ledger_change(true, Decimal::ZERO), LedgerChange::Delete);
        assert_eq!(ledger_change(false, Decimal::ZERO), LedgerChange::Unchanged);
    }

    #[test]
    fn test_ledger_change_rounds_before_deciding() {
        // Below half a paisa rounds to nothing
        assert_eq!(ledger_change(true, Decimal::new(4, 3)), LedgerChange::Delete);
        assert_eq!(ledger_change(false, Decimal::new(10005, 3)), LedgerChange::Insert(Decimal::new(1001, 2)));
    }

    #[test]
    fn test_check_range() {
        let d1 = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        assert!(check_range(Some(d1), Some(d2)).is_ok());
        assert!(check_range(None, Some(d1)).is_ok());
        assert!(check_range(Some(d2), Some(d1)).is_err());
    }
}
