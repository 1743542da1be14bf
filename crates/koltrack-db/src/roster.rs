//! Bulk roster fetch: one KOL query plus three concurrent child queries keyed by
//! the KOL id set, assembled into domain [`Kol`] values.

use std::collections::HashMap;

use futures::try_join;
use koltrack_core::Kol;
use sqlx::PgPool;
use uuid::Uuid;

use crate::documents::{list_documents_for, DocumentRow};
use crate::kols::{get_kol_row, list_kol_rows, KolRow};
use crate::platforms::{list_platforms_for, PlatformRow};
use crate::posts::{list_posts_for, PostRow};
use crate::DbError;

/// Every KOL with its platform links, posts and documents, newest KOL first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails, or [`DbError::Decode`] if a
/// stored enum value is unknown.
pub async fn fetch_roster(pool: &PgPool) -> Result<Vec<Kol>, DbError> {
    let kol_rows = list_kol_rows(pool).await?;
    assemble(pool, kol_rows).await
}

/// A single KOL with its children, or `None` if it does not exist.
///
/// # Errors
///
/// Returns [`DbError`] under the same conditions as [`fetch_roster`].
pub async fn fetch_kol(pool: &PgPool, kol_id: Uuid) -> Result<Option<Kol>, DbError> {
    let Some(row) = get_kol_row(pool, kol_id).await? else {
        return Ok(None);
    };
    Ok(assemble(pool, vec![row]).await?.pop())
}

async fn assemble(pool: &PgPool, kol_rows: Vec<KolRow>) -> Result<Vec<Kol>, DbError> {
    if kol_rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = kol_rows.iter().map(|r| r.id).collect();

    let (platform_rows, post_rows, document_rows) = try_join!(
        list_platforms_for(pool, &ids),
        list_posts_for(pool, &ids),
        list_documents_for(pool, &ids),
    )?;

    let mut platforms = group(platform_rows, |r| r.kol_id, PlatformRow::into_link)?;
    let mut posts = group(post_rows, |r| r.kol_id, PostRow::into_post)?;
    let mut documents = group(document_rows, |r| r.kol_id, DocumentRow::into_document)?;

    kol_rows
        .into_iter()
        .map(|row| {
            let id = row.id;
            Ok(Kol::new(
                row.into_profile()?,
                platforms.remove(&id).unwrap_or_default(),
                posts.remove(&id).unwrap_or_default(),
                documents.remove(&id).unwrap_or_default(),
            ))
        })
        .collect()
}

/// Decode child rows and bucket them by owning KOL, keeping row order.
fn group<R, T>(
    rows: Vec<R>,
    owner: impl Fn(&R) -> Uuid,
    decode: impl Fn(R) -> Result<T, DbError>,
) -> Result<HashMap<Uuid, Vec<T>>, DbError> {
    let mut out: HashMap<Uuid, Vec<T>> = HashMap::new();
    for row in rows {
        let kol_id = owner(&row);
        out.entry(kol_id).or_default().push(decode(row)?);
    }
    Ok(out)
}

