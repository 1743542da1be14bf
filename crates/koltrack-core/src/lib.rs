//! Domain model and pure computation for the KOL tracker.
//!
//! Everything in this crate is synchronous and side-effect free apart from
//! configuration loading: metrics aggregation, roster snapshot mutations, budget
//! summaries and the import intent model.

pub mod app_config;
pub mod budget;
pub mod config;
pub mod demo;
pub mod import;
pub mod intent;
pub mod kol;
pub mod metrics;
pub mod roster;

#[cfg(test)]
mod fixtures;

use thiserror::Error;

pub use app_config::{AppConfig, DataSourceKind, Environment};
pub use budget::{
    summarize_budget, BudgetPeriod, BudgetSummary, Invoice, InvoiceStatus, StatusCount,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use demo::{demo_roster, DemoInvoice, DemoKol};
pub use import::{
    load_import_file, parse_import_file, ImportFile, ImportResult, ImportRow, ImportRowError,
    PreparedRow,
};
pub use intent::{
    validate_email, validate_http_url, CreateKol, DocumentPatch, InvoicePatch, NewDocument,
    NewInvoice, NewPlatformLink, NewPost, PostPatch, UpdateKol,
};
pub use kol::{
    ContentPost, DocumentType, Kol, KolDocument, KolProfile, KolStatus, Platform, PlatformLink,
};
pub use metrics::{
    calculate_cpm, calculate_roi, compute_entity_metrics, compute_roster_metrics, cpm_by_kol,
    weekly_performance, KolCpm, KolMetrics, PlatformBudget, RosterMetrics, TopPerformer,
    WeeklyPerformance,
};
pub use roster::{
    apply_document_mutation, apply_platform_replace, apply_post_mutation, insert_kol, remove_kol,
    replace_kol, DocumentMutation, KolFilter, PostMutation, Roster,
};

/// Errors raised when decoding stored or submitted values into domain types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid platform: {0}")]
    InvalidPlatform(String),
    #[error("invalid kol status: {0}")]
    InvalidStatus(String),
    #[error("invalid document type: {0}")]
    InvalidDocumentType(String),
    #[error("invalid invoice status: {0}")]
    InvalidInvoiceStatus(String),
    #[error("invalid budget period: {0}")]
    InvalidBudgetPeriod(String),
    #[error("validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read import file {path}: {source}")]
    ImportFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse import file: {0}")]
    ImportFileParse(#[from] serde_yaml::Error),
}
