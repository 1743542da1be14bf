//! Roster service: the single owner of the in-process roster snapshot.
//!
//! Callers hand it create/update/delete intents; it forwards them to the
//! configured [`DataSource`] and folds the stored result back into the snapshot
//! through the pure functions in `koltrack-core`.

mod error;
mod service;
mod source;
mod static_source;

use koltrack_core::AppConfig;

pub use error::ServiceError;
pub use service::RosterService;
pub use source::{DataSource, RemoteDataSource};
pub use static_source::StaticDataSource;

/// Pick the data source the configuration asks for.
///
/// # Errors
///
/// Returns [`ServiceError::Db`] if a remote source is selected and the pool
/// cannot be created.
pub async fn data_source_from_config(config: &AppConfig) -> Result<DataSource, ServiceError> {
    if config.uses_remote_source() {
        let pool = koltrack_db::connect_pool_from_config(config).await?;
        tracing::info!("using remote data source");
        Ok(DataSource::Remote(RemoteDataSource::new(pool)))
    } else {
        tracing::info!("no database configured, using static demo roster");
        Ok(DataSource::Static(StaticDataSource::demo()))
    }
}
