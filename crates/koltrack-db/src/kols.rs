//! Database operations for the `kols` table.

use chrono::{DateTime, Utc};
use koltrack_core::{CreateKol, KolProfile, UpdateKol};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const KOL_COLUMNS: &str = "id, name, email, telegram_handle, notes, status, kyc_completed, \
                           created_at, updated_at";

/// A row from the `kols` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KolRow {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub telegram_handle: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub kyc_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KolRow {
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if the stored status is not a known value.
    pub fn into_profile(self) -> Result<KolProfile, DbError> {
        Ok(KolProfile {
            id: self.id,
            name: self.name,
            email: self.email,
            telegram_handle: self.telegram_handle,
            notes: self.notes,
            status: self.status.parse()?,
            kyc_completed: self.kyc_completed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Inserts the profile columns of a new KOL. Platform links and documents are
/// written by separate calls.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_kol(pool: &PgPool, intent: &CreateKol) -> Result<KolRow, DbError> {
    let row = sqlx::query_as::<_, KolRow>(&format!(
        "INSERT INTO kols (name, email, telegram_handle, notes, status, kyc_completed) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {KOL_COLUMNS}"
    ))
    .bind(intent.display_name())
    .bind(&intent.email)
    .bind(&intent.telegram_handle)
    .bind(&intent.notes)
    .bind(intent.status.as_str())
    .bind(intent.kyc_completed)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_kol_row(pool: &PgPool, kol_id: Uuid) -> Result<Option<KolRow>, DbError> {
    let row = sqlx::query_as::<_, KolRow>(&format!("SELECT {KOL_COLUMNS} FROM kols WHERE id = $1"))
        .bind(kol_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// All KOL rows, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_kol_rows(pool: &PgPool) -> Result<Vec<KolRow>, DbError> {
    let rows = sqlx::query_as::<_, KolRow>(&format!(
        "SELECT {KOL_COLUMNS} FROM kols ORDER BY created_at DESC, id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Overlays the supplied profile fields onto an existing KOL.
///
/// Nullable columns take `Option<Option<_>>`: `None` keeps the stored value,
/// `Some(None)` clears it. Returns `None` when no KOL has `kol_id`. The
/// `platforms` field of the patch is ignored here; see
/// [`crate::platforms::replace_platforms`].
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn update_kol(
    pool: &PgPool,
    kol_id: Uuid,
    patch: &UpdateKol,
) -> Result<Option<KolRow>, DbError> {
    let row = sqlx::query_as::<_, KolRow>(&format!(
        "UPDATE kols \
         SET name            = COALESCE($2, name), \
             email           = CASE WHEN $3::BOOL THEN $4 ELSE email END, \
             telegram_handle = CASE WHEN $5::BOOL THEN $6 ELSE telegram_handle END, \
             notes           = CASE WHEN $7::BOOL THEN $8 ELSE notes END, \
             status          = COALESCE($9, status), \
             kyc_completed   = COALESCE($10, kyc_completed), \
             updated_at      = NOW() \
         WHERE id = $1 \
         RETURNING {KOL_COLUMNS}"
    ))
    .bind(kol_id)
    .bind(patch.name.as_deref().map(str::trim))
    .bind(patch.email.is_some())
    .bind(patch.email.clone().flatten())
    .bind(patch.telegram_handle.is_some())
    .bind(patch.telegram_handle.clone().flatten())
    .bind(patch.notes.is_some())
    .bind(patch.notes.clone().flatten())
    .bind(patch.status.map(|s| s.as_str()))
    .bind(patch.kyc_completed)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Deletes a KOL; platform links, posts, documents and invoices cascade.
///
/// Returns `false` when no row matched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_kol(pool: &PgPool, kol_id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM kols WHERE id = $1")
        .bind(kol_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_decodes_into_profile() {
        let row = KolRow {
            id: Uuid::new_v4(),
            name: "Coach Ty".to_string(),
            email: None,
            telegram_handle: Some("@coachty".to_string()),
            notes: None,
            status: "in_contact".to_string(),
            kyc_completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let profile = row.into_profile().unwrap();
        assert_eq!(profile.status, koltrack_core::KolStatus::InContact);
        assert_eq!(profile.telegram_handle.as_deref(), Some("@coachty"));
    }

    #[test]
    fn unknown_status_is_decode_error() {
        let row = KolRow {
            id: Uuid::new_v4(),
            name: "X".to_string(),
            email: None,
            telegram_handle: None,
            notes: None,
            status: "ghosted".to_string(),
            kyc_completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(matches!(row.into_profile(), Err(DbError::Decode(_))));
    }
}
