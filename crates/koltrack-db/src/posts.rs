//! Database operations for the `content_posts` table.

use chrono::{DateTime, NaiveDate, Utc};
use koltrack_core::{ContentPost, CoreError, NewPost, PostPatch};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{decimal_to_f64, DbError};

const POST_COLUMNS: &str = "id, kol_id, platform, url, title, posted_date, impressions, \
                            engagement, clicks, cost, notes, created_at, updated_at";

/// A row from the `content_posts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub kol_id: Uuid,
    pub platform: String,
    pub url: String,
    pub title: Option<String>,
    pub posted_date: NaiveDate,
    pub impressions: i64,
    pub engagement: Option<i64>,
    pub clicks: Option<i64>,
    /// `NUMERIC(14,2)`; converted to `f64` at the domain boundary.
    pub cost: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostRow {
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if the stored platform is not a known value.
    pub fn into_post(self) -> Result<ContentPost, DbError> {
        Ok(ContentPost {
            id: self.id,
            kol_id: self.kol_id,
            platform: self.platform.parse()?,
            url: self.url,
            title: self.title,
            posted_date: self.posted_date,
            impressions: self.impressions,
            engagement: self.engagement,
            clicks: self.clicks,
            cost: self.cost.map(decimal_to_f64),
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Inserts a post for `kol_id`.
///
/// `cost` is bound as `f64` and cast to `NUMERIC(14,2)` by the database, so
/// sub-cent amounts are rounded on persistence.
///
/// # Errors
///
/// Returns [`DbError::Decode`] if the platform cannot be resolved, or
/// [`DbError::Sqlx`] if the insert fails (including an unknown `kol_id`).
pub async fn create_post(pool: &PgPool, kol_id: Uuid, post: &NewPost) -> Result<PostRow, DbError> {
    let platform = post
        .resolved_platform()
        .ok_or_else(|| CoreError::InvalidPlatform(post.url.clone()))?;
    let row = sqlx::query_as::<_, PostRow>(&format!(
        "INSERT INTO content_posts \
             (kol_id, platform, url, title, posted_date, impressions, engagement, clicks, \
              cost, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9::numeric(14,2), $10) \
         RETURNING {POST_COLUMNS}"
    ))
    .bind(kol_id)
    .bind(platform.as_str())
    .bind(&post.url)
    .bind(&post.title)
    .bind(post.posted_date)
    .bind(post.impressions)
    .bind(post.engagement)
    .bind(post.clicks)
    .bind(post.cost)
    .bind(&post.notes)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Overlays `patch` onto a post owned by `kol_id`.
///
/// Returns `None` when the post does not exist or belongs to another KOL.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn update_post(
    pool: &PgPool,
    kol_id: Uuid,
    post_id: Uuid,
    patch: &PostPatch,
) -> Result<Option<PostRow>, DbError> {
    let row = sqlx::query_as::<_, PostRow>(&format!(
        "UPDATE content_posts \
         SET platform    = COALESCE($3, platform), \
             url         = COALESCE($4, url), \
             title       = CASE WHEN $5::BOOL THEN $6 ELSE title END, \
             posted_date = COALESCE($7, posted_date), \
             impressions = COALESCE($8, impressions), \
             engagement  = CASE WHEN $9::BOOL THEN $10 ELSE engagement END, \
             clicks      = CASE WHEN $11::BOOL THEN $12 ELSE clicks END, \
             cost        = CASE WHEN $13::BOOL THEN $14::numeric(14,2) ELSE cost END, \
             notes       = CASE WHEN $15::BOOL THEN $16 ELSE notes END, \
             updated_at  = NOW() \
         WHERE id = $2 AND kol_id = $1 \
         RETURNING {POST_COLUMNS}"
    ))
    .bind(kol_id)
    .bind(post_id)
    .bind(patch.platform.map(|p| p.as_str()))
    .bind(&patch.url)
    .bind(patch.title.is_some())
    .bind(patch.title.clone().flatten())
    .bind(patch.posted_date)
    .bind(patch.impressions)
    .bind(patch.engagement.is_some())
    .bind(patch.engagement.flatten())
    .bind(patch.clicks.is_some())
    .bind(patch.clicks.flatten())
    .bind(patch.cost.is_some())
    .bind(patch.cost.flatten())
    .bind(patch.notes.is_some())
    .bind(patch.notes.clone().flatten())
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Returns `false` when no post matched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_post(pool: &PgPool, kol_id: Uuid, post_id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM content_posts WHERE id = $2 AND kol_id = $1")
        .bind(kol_id)
        .bind(post_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Posts for every KOL in `kol_ids`, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_posts_for(pool: &PgPool, kol_ids: &[Uuid]) -> Result<Vec<PostRow>, DbError> {
    let rows = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {POST_COLUMNS} FROM content_posts \
         WHERE kol_id = ANY($1) \
         ORDER BY posted_date, created_at, id"
    ))
    .bind(kol_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
