//! Daily document number sequences (ORD-, BILL-, INV-)

use chrono::NaiveDate;
use shared::{DocumentKind, DocumentNumber};
use sqlx::PgConnection;

use crate::error::{AppError, AppResult};

/// Allocate the next document number for `kind` on `date`.
///
/// The counter row is bumped with a single upsert, so concurrent callers
/// never see the same value. Call it inside the transaction that inserts
/// the document: a rollback then releases nothing but a gap.
pub async fn next_document_number(
    conn: &mut PgConnection,
    kind: DocumentKind,
    date: NaiveDate,
) -> AppResult<DocumentNumber> {
    let key = kind.sequence_key(date);

    let value = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO document_sequences (sequence_key, last_value)
        VALUES ($1, 1)
        ON CONFLICT (sequence_key)
        DO UPDATE SET last_value = document_sequences.last_value + 1
        RETURNING last_value
        "#,
    )
    .bind(&key)
    .fetch_one(&mut *conn)
    .await?;

    let sequence = u32::try_from(value)
        .map_err(|_| AppError::Internal(format!("Sequence {} out of range: {}", key, value)))?;

    DocumentNumber::new(kind, date, sequence).map_err(|e| AppError::Internal(e.to_string()))
}
