//! Roster commands that go through `RosterService`, so they work against the
//! demo roster or the database depending on `KOLTRACK_DATA_SOURCE`.

use std::path::Path;

use koltrack_core::{AppConfig, ImportResult, RosterMetrics};
use koltrack_service::{data_source_from_config, RosterService};

async fn load_service(config: &AppConfig) -> anyhow::Result<RosterService> {
    let source = data_source_from_config(config).await?;
    let service = RosterService::new(source, config.top_performers);
    let loaded = service.load().await?;
    tracing::info!(
        kols = loaded,
        data_source = service.source().kind(),
        "roster loaded"
    );
    Ok(service)
}

pub(crate) async fn run_metrics(config: &AppConfig, top: Option<usize>) -> anyhow::Result<()> {
    let service = load_service(config).await?;
    let metrics = service.roster_metrics(top).await;
    print!("{}", format_metrics(&metrics));
    Ok(())
}

/// Import KOLs from `path`. Bad rows are reported and skipped; the command
/// fails only when the file itself cannot be read or parsed.
pub(crate) async fn run_import(config: &AppConfig, path: &Path, dry_run: bool) -> anyhow::Result<()> {
    let file = koltrack_core::load_import_file(path)?;
    tracing::info!(path = %path.display(), rows = file.kols.len(), dry_run, "import file parsed");

    if dry_run {
        let mut result = ImportResult::default();
        for (index, row) in file.kols.into_iter().enumerate() {
            match row.prepare() {
                Ok(prepared) => {
                    result.imported_count += 1;
                    result.record_warnings(index + 1, prepared.warnings);
                }
                Err(message) => result.record_failure(index + 1, message),
            }
        }
        println!("dry-run: nothing was created");
        print!("{}", format_import(&result));
        return Ok(());
    }

    let service = load_service(config).await?;
    let result = service.import(file).await;
    print!("{}", format_import(&result));
    Ok(())
}

fn format_metrics(metrics: &RosterMetrics) -> String {
    let mut out = format!(
        "KOLs: {}\nposts: {}\nspend: {:.2}\nimpressions: {}\nreach: {}\naverage CPM: {:.2}\n",
        metrics.total_kols,
        metrics.total_posts,
        metrics.total_spend,
        metrics.total_impressions,
        metrics.total_followers_reach,
        metrics.average_cpm,
    );

    out.push_str("\nbudget by platform\n");
    for share in &metrics.budget_by_platform {
        out.push_str(&format!("  {:<10}{:>12.2}\n", share.platform.as_str(), share.amount));
    }

    if !metrics.top_performers.is_empty() {
        out.push_str(&format!("\n{:<4}{:<28}{:>10}{:>12}\n", "#", "KOL", "CPM", "SPEND"));
        for (rank, kol) in metrics.top_performers.iter().enumerate() {
            out.push_str(&format!(
                "{:<4}{:<28}{:>10.2}{:>12.2}\n",
                rank + 1,
                kol.name,
                kol.average_cpm,
                kol.total_cost
            ));
        }
    }
    out
}

fn format_import(result: &ImportResult) -> String {
    let mut out = format!(
        "imported: {}\nfailed: {}\n",
        result.imported_count, result.failed_count
    );
    for error in &result.errors {
        out.push_str(&format!("  row {}: {}\n", error.row, error.message));
    }
    for warning in &result.warnings {
        out.push_str(&format!("  row {} (warning): {}\n", warning.row, warning.message));
    }
    out
}
