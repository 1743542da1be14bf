//! Database operations for the `kol_platforms` table.

use koltrack_core::{CoreError, NewPlatformLink, PlatformLink};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const PLATFORM_COLUMNS: &str = "id, kol_id, platform, profile_url, follower_count, username";

/// A row from the `kol_platforms` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlatformRow {
    pub id: Uuid,
    pub kol_id: Uuid,
    pub platform: String,
    pub profile_url: String,
    pub follower_count: i64,
    pub username: Option<String>,
}

impl PlatformRow {
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if the stored platform is not a known value.
    pub fn into_link(self) -> Result<PlatformLink, DbError> {
        Ok(PlatformLink {
            id: self.id,
            kol_id: self.kol_id,
            platform: self.platform.parse()?,
            profile_url: self.profile_url,
            follower_count: self.follower_count,
            username: self.username,
        })
    }
}

/// Inserts platform links for a KOL, one statement per link, in order.
///
/// # Errors
///
/// Returns [`DbError::Decode`] if a link's platform cannot be resolved, or
/// [`DbError::Sqlx`] if an insert fails. Links inserted before the failure
/// stay committed.
pub async fn create_platforms(
    pool: &PgPool,
    kol_id: Uuid,
    links: &[NewPlatformLink],
) -> Result<Vec<PlatformRow>, DbError> {
    let mut rows = Vec::with_capacity(links.len());
    for link in links {
        let platform = link
            .resolved_platform()
            .ok_or_else(|| CoreError::InvalidPlatform(link.profile_url.clone()))?;
        let row = sqlx::query_as::<_, PlatformRow>(&format!(
            "INSERT INTO kol_platforms (kol_id, platform, profile_url, follower_count, username) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {PLATFORM_COLUMNS}"
        ))
        .bind(kol_id)
        .bind(platform.as_str())
        .bind(&link.profile_url)
        .bind(link.follower_count)
        .bind(&link.username)
        .fetch_one(pool)
        .await?;
        rows.push(row);
    }
    Ok(rows)
}

/// Replaces a KOL's whole platform set: delete everything, then insert.
///
/// The two steps are separate statements. If an insert fails after the delete,
/// the KOL is left with only the links inserted so far.
///
/// # Errors
///
/// Returns [`DbError`] if the delete or any insert fails.
pub async fn replace_platforms(
    pool: &PgPool,
    kol_id: Uuid,
    links: &[NewPlatformLink],
) -> Result<Vec<PlatformRow>, DbError> {
    sqlx::query("DELETE FROM kol_platforms WHERE kol_id = $1")
        .bind(kol_id)
        .execute(pool)
        .await?;
    create_platforms(pool, kol_id, links).await
}

/// Platform links for every KOL in `kol_ids`, in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_platforms_for(
    pool: &PgPool,
    kol_ids: &[Uuid],
) -> Result<Vec<PlatformRow>, DbError> {
    let rows = sqlx::query_as::<_, PlatformRow>(&format!(
        "SELECT {PLATFORM_COLUMNS} FROM kol_platforms \
         WHERE kol_id = ANY($1) \
         ORDER BY created_at, id"
    ))
    .bind(kol_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
