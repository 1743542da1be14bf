//! Bulk entity-creation intents read from a YAML or JSON file.
//!
//! Each row is turned into a [`CreateKol`] and submitted through the same
//! creation path as manual entry. Rows are independent: a bad row is recorded
//! in the [`ImportResult`] and the rest carry on.

use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::intent::{CreateKol, NewDocument, NewPlatformLink};
use crate::kol::{KolStatus, Platform};
use crate::ConfigError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportFile {
    #[serde(default)]
    pub kols: Vec<ImportRow>,
}

/// One roster row as written by hand or exported from a spreadsheet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportRow {
    pub name: Option<String>,
    pub email: Option<String>,
    pub telegram_handle: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub status: KolStatus,
    #[serde(default)]
    pub kyc_completed: bool,
    #[serde(default)]
    pub platforms: Vec<ImportPlatform>,
    #[serde(default)]
    pub documents: Vec<NewDocument>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportPlatform {
    pub platform: Option<Platform>,
    #[serde(default)]
    pub profile_url: String,
    /// A plain number or a display string such as `"258K"` or `"1.2M"`.
    pub followers: Option<FollowerCount>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FollowerCount {
    Number(f64),
    Text(String),
}

impl FollowerCount {
    #[must_use]
    pub fn value(&self) -> i64 {
        match self {
            FollowerCount::Number(n) => round_count(*n),
            FollowerCount::Text(s) => parse_follower_count(s),
        }
    }
}

/// A validated row ready for submission, plus non-fatal remarks about it.
#[derive(Debug, Clone)]
pub struct PreparedRow {
    pub intent: CreateKol,
    pub warnings: Vec<String>,
}

impl ImportRow {
    /// Validate the row and build the creation intent.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message when the row has no name or fails
    /// [`CreateKol::validate`].
    pub fn prepare(self) -> Result<PreparedRow, String> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| "Name is required".to_string())?
            .to_string();

        let mut warnings = Vec::new();
        let mut platforms = Vec::with_capacity(self.platforms.len());
        for link in self.platforms {
            let url = link.profile_url.trim().to_string();
            let Some(platform) = link.platform.or_else(|| Platform::from_url(&url)) else {
                warnings.push(format!("skipped link with unrecognised platform: {url}"));
                continue;
            };
            platforms.push(NewPlatformLink {
                platform: Some(platform),
                profile_url: url,
                follower_count: link.followers.as_ref().map_or(0, FollowerCount::value),
                username: link.username,
            });
        }
        if platforms.is_empty() {
            warnings.push("No platforms detected".to_string());
        }

        let email = trimmed(self.email);
        if email.is_none() {
            warnings.push("No email provided".to_string());
        }

        let intent = CreateKol {
            name,
            email,
            telegram_handle: trimmed(self.telegram_handle),
            notes: trimmed(self.notes),
            status: self.status,
            kyc_completed: self.kyc_completed,
            platforms,
            documents: self.documents,
        };
        intent.validate().map_err(|e| e.to_string())?;
        Ok(PreparedRow { intent, warnings })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRowError {
    /// 1-based position of the row in the file.
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    pub imported_count: usize,
    pub failed_count: usize,
    pub errors: Vec<ImportRowError>,
    pub warnings: Vec<ImportRowError>,
    pub imported_ids: Vec<Uuid>,
}

impl ImportResult {
    #[must_use]
    pub fn success(&self) -> bool {
        self.failed_count == 0
    }

    pub fn record_imported(&mut self, kol_id: Uuid) {
        self.imported_count += 1;
        self.imported_ids.push(kol_id);
    }

    pub fn record_failure(&mut self, row: usize, message: impl Into<String>) {
        self.failed_count += 1;
        self.errors.push(ImportRowError {
            row,
            message: message.into(),
        });
    }

    pub fn record_warnings(&mut self, row: usize, warnings: Vec<String>) {
        self.warnings.extend(
            warnings
                .into_iter()
                .map(|message| ImportRowError { row, message }),
        );
    }
}

/// Read an import file from disk. JSON files parse as YAML.
///
/// # Errors
///
/// Returns [`ConfigError::ImportFileIo`] when the file cannot be read and
/// [`ConfigError::ImportFileParse`] when it is not a valid import document.
pub fn load_import_file(path: &Path) -> Result<ImportFile, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ImportFileIo {
        path: path.display().to_string(),
        source,
    })?;
    parse_import_file(&raw)
}

/// # Errors
///
/// Returns [`ConfigError::ImportFileParse`] when `raw` is not a valid import
/// document.
pub fn parse_import_file(raw: &str) -> Result<ImportFile, ConfigError> {
    Ok(serde_yaml::from_str(raw)?)
}

/// Parse counts such as `"12,500"`, `"258K"`, `"1.2M"` or `"2b"`. Anything
/// unparseable reads as zero.
#[must_use]
pub fn parse_follower_count(raw: &str) -> i64 {
    let cleaned: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return 0;
    }
    let (digits, multiplier) = match cleaned.chars().last() {
        Some('k') => (&cleaned[..cleaned.len() - 1], 1_000.0),
        Some('m') => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        Some('b') => (&cleaned[..cleaned.len() - 1], 1_000_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };
    digits
        .parse::<f64>()
        .map_or(0, |n| round_count(n * multiplier))
}

#[allow(clippy::cast_possible_truncation)] // saturating; NaN becomes 0
fn round_count(n: f64) -> i64 {
    n.round() as i64
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
