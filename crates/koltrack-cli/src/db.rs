//! Database maintenance commands. Each expects a connected pool.

pub(crate) async fn run_ping(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    koltrack_db::ping(pool).await?;
    println!("database reachable");
    Ok(())
}

pub(crate) async fn run_migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let applied = koltrack_db::run_migrations(pool).await?;
    tracing::info!(applied, "migrations complete");
    println!("applied {applied} migration(s)");
    Ok(())
}

/// Seed the demo roster. A database that already holds KOLs is left alone.
pub(crate) async fn run_seed(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let roster = koltrack_core::demo_roster();
    let inserted = koltrack_db::seed_demo_roster(pool, &roster).await?;
    if inserted == 0 {
        println!("roster already populated; nothing seeded");
    } else {
        println!("seeded {inserted} KOL(s)");
    }
    Ok(())
}
