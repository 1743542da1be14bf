mod db;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "koltrack-cli")]
#[command(about = "KOL roster tracking command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance.
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Print roster totals, the platform budget split and top performers.
    Metrics {
        /// Number of top performers to list; defaults to the configured value.
        #[arg(long)]
        top: Option<usize>,
    },
    /// Create KOLs from a YAML or JSON import file.
    Import {
        file: PathBuf,
        /// Parse and validate the file without creating anything.
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
    /// Load the demo roster into an empty database.
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = koltrack_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Db { command }) => {
            let pool = koltrack_db::connect_pool_from_config(&config).await?;
            match command {
                DbCommands::Ping => db::run_ping(&pool).await?,
                DbCommands::Migrate => db::run_migrate(&pool).await?,
                DbCommands::Seed => db::run_seed(&pool).await?,
            }
            pool.close().await;
        }
        Some(Commands::Metrics { top }) => report::run_metrics(&config, top).await?,
        Some(Commands::Import { file, dry_run }) => {
            report::run_import(&config, &file, dry_run).await?;
        }
        None => println!("koltrack-cli: run with --help to list commands"),
    }

    Ok(())
}
