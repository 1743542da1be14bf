mod api;
mod middleware;

use std::sync::Arc;

use koltrack_service::{data_source_from_config, DataSource, RosterService};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = koltrack_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let source = data_source_from_config(&config).await?;
    if let DataSource::Remote(remote) = &source {
        let applied = koltrack_db::run_migrations(remote.pool()).await?;
        tracing::info!(applied, "migrations checked");
    }

    let service = RosterService::new(source, config.top_performers);
    let loaded = service.load().await?;
    tracing::info!(
        kols = loaded,
        data_source = service.source().kind(),
        "roster loaded"
    );

    let auth = AuthState::from_env(
        matches!(config.env, koltrack_core::Environment::Development),
        config.api_key_hash_salt.as_deref(),
    )?;
    let app = build_app(
        AppState {
            service: Arc::new(service),
        },
        auth,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
