//! Database operations for the `kol_documents` table. Only metadata is stored;
//! file bytes live wherever `url` / `file_path` point.

use chrono::{DateTime, Utc};
use koltrack_core::{DocumentType, KolDocument, NewDocument};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const DOCUMENT_COLUMNS: &str = "id, kol_id, name, doc_type, size, url, file_path, notes, uploaded_at";

/// A row from the `kol_documents` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub kol_id: Uuid,
    pub name: String,
    pub doc_type: String,
    pub size: i64,
    pub url: Option<String>,
    pub file_path: Option<String>,
    pub notes: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl DocumentRow {
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if the stored type is not a known value.
    pub fn into_document(self) -> Result<KolDocument, DbError> {
        Ok(KolDocument {
            id: self.id,
            kol_id: self.kol_id,
            name: self.name,
            doc_type: self.doc_type.parse()?,
            size: self.size,
            url: self.url,
            file_path: self.file_path,
            notes: self.notes,
            uploaded_at: self.uploaded_at,
        })
    }
}

/// Inserts document metadata, one statement per document. A missing type is
/// inferred from the file name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if an insert fails. Earlier inserts stay
/// committed.
pub async fn create_documents(
    pool: &PgPool,
    kol_id: Uuid,
    documents: &[NewDocument],
) -> Result<Vec<DocumentRow>, DbError> {
    let mut rows = Vec::with_capacity(documents.len());
    for doc in documents {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "INSERT INTO kol_documents (kol_id, name, doc_type, size, url, file_path, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(kol_id)
        .bind(&doc.name)
        .bind(doc.resolved_type().as_str())
        .bind(doc.size.max(0))
        .bind(&doc.url)
        .bind(&doc.file_path)
        .bind(&doc.notes)
        .fetch_one(pool)
        .await?;
        rows.push(row);
    }
    Ok(rows)
}

/// Overrides a document's type. Returns `None` when the document does not
/// exist or belongs to another KOL.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn retype_document(
    pool: &PgPool,
    kol_id: Uuid,
    document_id: Uuid,
    doc_type: DocumentType,
) -> Result<Option<DocumentRow>, DbError> {
    let row = sqlx::query_as::<_, DocumentRow>(&format!(
        "UPDATE kol_documents SET doc_type = $3 \
         WHERE id = $2 AND kol_id = $1 \
         RETURNING {DOCUMENT_COLUMNS}"
    ))
    .bind(kol_id)
    .bind(document_id)
    .bind(doc_type.as_str())
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Returns `false` when no document matched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_document(
    pool: &PgPool,
    kol_id: Uuid,
    document_id: Uuid,
) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM kol_documents WHERE id = $2 AND kol_id = $1")
        .bind(kol_id)
        .bind(document_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Documents for every KOL in `kol_ids`, newest upload first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_documents_for(
    pool: &PgPool,
    kol_ids: &[Uuid],
) -> Result<Vec<DocumentRow>, DbError> {
    let rows = sqlx::query_as::<_, DocumentRow>(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM kol_documents \
         WHERE kol_id = ANY($1) \
         ORDER BY uploaded_at DESC, id"
    ))
    .bind(kol_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
