use koltrack_core::DemoKol;
use sqlx::PgPool;

use crate::{documents, invoices, kols, platforms, posts, DbError};

/// Load the demo roster into an empty database.
///
/// Does nothing and returns `0` when any KOL already exists, so it is safe to
/// re-run. Otherwise returns the number of KOLs inserted. Entries go through the
/// same create calls the API uses; a failure part way leaves earlier entries in
/// place.
///
/// # Errors
///
/// Returns [`DbError`] if any insert fails.
pub async fn seed_demo_roster(pool: &PgPool, roster: &[DemoKol]) -> Result<usize, DbError> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kols")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(0);
    }

    let mut count = 0usize;
    for entry in roster {
        let row = kols::create_kol(pool, &entry.kol).await?;
        platforms::create_platforms(pool, row.id, &entry.kol.platforms).await?;
        documents::create_documents(pool, row.id, &entry.kol.documents).await?;
        for post in &entry.posts {
            posts::create_post(pool, row.id, post).await?;
        }
        for invoice in &entry.invoices {
            invoices::create_invoice(pool, &invoice.for_kol(row.id)).await?;
        }
        count += 1;
    }
    Ok(count)
}
