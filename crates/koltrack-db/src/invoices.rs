//! Database operations for the `invoices` table.

use chrono::{DateTime, NaiveDate, Utc};
use koltrack_core::{Invoice, InvoicePatch, InvoiceStatus, NewInvoice};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{decimal_to_f64, DbError};

const INVOICE_COLUMNS: &str = "id, kol_id, amount, currency, status, budget_period, due_date, \
                               paid_date, invoice_number, notes, created_at, updated_at";

/// A row from the `invoices` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceRow {
    pub id: Uuid,
    pub kol_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub budget_period: String,
    pub due_date: Option<NaiveDate>,
    pub paid_date: Option<NaiveDate>,
    pub invoice_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceRow {
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if the stored status or period is unknown.
    pub fn into_invoice(self) -> Result<Invoice, DbError> {
        Ok(Invoice {
            id: self.id,
            kol_id: self.kol_id,
            amount: decimal_to_f64(self.amount),
            currency: self.currency,
            status: self.status.parse()?,
            budget_period: self.budget_period.parse()?,
            due_date: self.due_date,
            paid_date: self.paid_date,
            invoice_number: self.invoice_number,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including an unknown
/// `kol_id`).
pub async fn create_invoice(pool: &PgPool, invoice: &NewInvoice) -> Result<InvoiceRow, DbError> {
    let paid_date = (invoice.status == InvoiceStatus::Paid).then(|| Utc::now().date_naive());
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
        "INSERT INTO invoices \
             (kol_id, amount, currency, status, budget_period, due_date, paid_date, \
              invoice_number, notes) \
         VALUES ($1, $2::numeric(14,2), $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {INVOICE_COLUMNS}"
    ))
    .bind(invoice.kol_id)
    .bind(invoice.amount)
    .bind(invoice.currency())
    .bind(invoice.status.as_str())
    .bind(invoice.budget_period.as_str())
    .bind(invoice.due_date)
    .bind(paid_date)
    .bind(&invoice.invoice_number)
    .bind(&invoice.notes)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_invoice(pool: &PgPool, invoice_id: Uuid) -> Result<Option<InvoiceRow>, DbError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
        "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"
    ))
    .bind(invoice_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// All invoices, optionally for one KOL, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_invoices(
    pool: &PgPool,
    kol_id: Option<Uuid>,
) -> Result<Vec<InvoiceRow>, DbError> {
    let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
        "SELECT {INVOICE_COLUMNS} FROM invoices \
         WHERE ($1::UUID IS NULL OR kol_id = $1) \
         ORDER BY created_at DESC, id"
    ))
    .bind(kol_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Overlays `patch` onto an invoice. Moving to `paid` without a paid date
/// stamps today's date. Returns `None` when no invoice has `invoice_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn update_invoice(
    pool: &PgPool,
    invoice_id: Uuid,
    patch: &InvoicePatch,
) -> Result<Option<InvoiceRow>, DbError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
        "UPDATE invoices \
         SET amount         = COALESCE($2::numeric(14,2), amount), \
             currency       = COALESCE($3, currency), \
             status         = COALESCE($4, status), \
             budget_period  = COALESCE($5, budget_period), \
             due_date       = CASE WHEN $6::BOOL THEN $7 ELSE due_date END, \
             paid_date      = CASE WHEN $8::BOOL THEN $9 \
                                   WHEN $4 = 'paid' AND paid_date IS NULL THEN CURRENT_DATE \
                                   ELSE paid_date END, \
             invoice_number = CASE WHEN $10::BOOL THEN $11 ELSE invoice_number END, \
             notes          = CASE WHEN $12::BOOL THEN $13 ELSE notes END, \
             updated_at     = NOW() \
         WHERE id = $1 \
         RETURNING {INVOICE_COLUMNS}"
    ))
    .bind(invoice_id)
    .bind(patch.amount)
    .bind(&patch.currency)
    .bind(patch.status.map(|s| s.as_str()))
    .bind(patch.budget_period.map(|p| p.as_str()))
    .bind(patch.due_date.is_some())
    .bind(patch.due_date.flatten())
    .bind(patch.paid_date.is_some())
    .bind(patch.paid_date.flatten())
    .bind(patch.invoice_number.is_some())
    .bind(patch.invoice_number.clone().flatten())
    .bind(patch.notes.is_some())
    .bind(patch.notes.clone().flatten())
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Returns `false` when no invoice matched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_invoice(pool: &PgPool, invoice_id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
        .bind(invoice_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
