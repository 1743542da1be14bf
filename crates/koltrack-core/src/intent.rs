//! Create/update intents submitted by callers before they reach storage.
//!
//! Patch types distinguish "leave as is" from "clear": an absent JSON field
//! deserializes to `None`, an explicit `null` to `Some(None)`.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use url::Url;
use uuid::Uuid;

use crate::budget::{BudgetPeriod, Invoice, InvoiceStatus};
use crate::kol::{ContentPost, DocumentType, KolProfile, KolStatus, Platform};
use crate::CoreError;

pub const MAX_NAME_LEN: usize = 200;
pub const DEFAULT_CURRENCY: &str = "USD";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

#[derive(Debug, Clone, Deserialize)]
pub struct CreateKol {
    pub name: String,
    pub email: Option<String>,
    pub telegram_handle: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub status: KolStatus,
    #[serde(default)]
    pub kyc_completed: bool,
    #[serde(default)]
    pub platforms: Vec<NewPlatformLink>,
    #[serde(default)]
    pub documents: Vec<NewDocument>,
}

impl CreateKol {
    /// Trimmed display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.trim()
    }

    /// Structural checks shared by manual entry and import.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for an empty or overlong name, a
    /// malformed email, or a platform link or document that fails its own
    /// checks.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        for link in &self.platforms {
            link.validate()?;
        }
        for document in &self.documents {
            document.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPlatformLink {
    /// Inferred from `profile_url` when omitted.
    pub platform: Option<Platform>,
    pub profile_url: String,
    #[serde(default)]
    pub follower_count: i64,
    pub username: Option<String>,
}

impl NewPlatformLink {
    #[must_use]
    pub fn resolved_platform(&self) -> Option<Platform> {
        self.platform
            .or_else(|| Platform::from_url(&self.profile_url))
    }

    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for a non-http(s) profile URL, a
    /// negative follower count or an unresolvable platform.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_http_url("profile_url", &self.profile_url)?;
        if self.follower_count < 0 {
            return Err(CoreError::Validation(format!(
                "follower_count must be non-negative for {}",
                self.profile_url
            )));
        }
        if self.resolved_platform().is_none() {
            return Err(CoreError::Validation(format!(
                "cannot determine platform for {}",
                self.profile_url
            )));
        }
        Ok(())
    }
}

/// Field-level update of a KOL. `platforms`, when present, replaces the whole
/// set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateKol {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub telegram_handle: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    pub status: Option<KolStatus>,
    pub kyc_completed: Option<bool>,
    pub platforms: Option<Vec<NewPlatformLink>>,
}

impl UpdateKol {
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when a supplied name or platform link
    /// is invalid.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(Some(email)) = &self.email {
            validate_email(email)?;
        }
        for link in self.platforms.iter().flatten() {
            link.validate()?;
        }
        Ok(())
    }

    /// True when any profile column changes, as opposed to a platform-only edit.
    #[must_use]
    pub fn touches_profile(&self) -> bool {
        self.name.is_some()
            || self.email.is_some()
            || self.telegram_handle.is_some()
            || self.notes.is_some()
            || self.status.is_some()
            || self.kyc_completed.is_some()
    }

    #[must_use]
    pub fn apply_to(&self, profile: &KolProfile, now: DateTime<Utc>) -> KolProfile {
        let mut next = profile.clone();
        if let Some(name) = &self.name {
            next.name = name.trim().to_string();
        }
        if let Some(email) = &self.email {
            next.email.clone_from(email);
        }
        if let Some(handle) = &self.telegram_handle {
            next.telegram_handle.clone_from(handle);
        }
        if let Some(notes) = &self.notes {
            next.notes.clone_from(notes);
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(kyc) = self.kyc_completed {
            next.kyc_completed = kyc;
        }
        next.updated_at = now;
        next
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    /// Inferred from `url` when omitted.
    pub platform: Option<Platform>,
    pub url: String,
    pub title: Option<String>,
    pub posted_date: NaiveDate,
    pub impressions: i64,
    pub engagement: Option<i64>,
    pub clicks: Option<i64>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
}

impl NewPost {
    #[must_use]
    pub fn resolved_platform(&self) -> Option<Platform> {
        self.platform.or_else(|| Platform::from_url(&self.url))
    }

    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for a non-http(s) URL, negative
    /// counts, a negative or non-finite cost, or an unresolvable platform.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_http_url("url", &self.url)?;
        validate_counts(self.impressions, self.engagement, self.clicks)?;
        validate_cost(self.cost)?;
        if self.resolved_platform().is_none() {
            return Err(CoreError::Validation(format!(
                "cannot determine platform for {}",
                self.url
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
    pub platform: Option<Platform>,
    pub url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    pub posted_date: Option<NaiveDate>,
    pub impressions: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub engagement: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub clicks: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cost: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl PostPatch {
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for a non-http(s) URL, negative counts
    /// or a negative or non-finite cost.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(url) = &self.url {
            validate_http_url("url", url)?;
        }
        validate_counts(
            self.impressions.unwrap_or(0),
            self.engagement.flatten(),
            self.clicks.flatten(),
        )?;
        validate_cost(self.cost.flatten())
    }

    #[must_use]
    pub fn apply_to(&self, post: &ContentPost, now: DateTime<Utc>) -> ContentPost {
        let mut next = post.clone();
        if let Some(platform) = self.platform {
            next.platform = platform;
        }
        if let Some(url) = &self.url {
            next.url.clone_from(url);
        }
        if let Some(title) = &self.title {
            next.title.clone_from(title);
        }
        if let Some(date) = self.posted_date {
            next.posted_date = date;
        }
        if let Some(impressions) = self.impressions {
            next.impressions = impressions;
        }
        if let Some(engagement) = self.engagement {
            next.engagement = engagement;
        }
        if let Some(clicks) = self.clicks {
            next.clicks = clicks;
        }
        if let Some(cost) = self.cost {
            next.cost = cost;
        }
        if let Some(notes) = &self.notes {
            next.notes.clone_from(notes);
        }
        next.updated_at = now;
        next
    }
}

/// Metadata for an uploaded file. The bytes themselves live elsewhere.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: Option<DocumentType>,
    #[serde(default)]
    pub size: i64,
    pub url: Option<String>,
    pub file_path: Option<String>,
    pub notes: Option<String>,
}

impl NewDocument {
    /// Explicit type, or one inferred from the file name.
    #[must_use]
    pub fn resolved_type(&self) -> DocumentType {
        self.doc_type
            .unwrap_or_else(|| DocumentType::infer_from_filename(&self.name))
    }

    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for an empty or overlong file name, a
    /// negative size or a non-http(s) URL.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        if self.size < 0 {
            return Err(CoreError::Validation(
                "size must be non-negative".to_string(),
            ));
        }
        if let Some(url) = &self.url {
            validate_http_url("url", url)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DocumentPatch {
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewInvoice {
    pub kol_id: Uuid,
    pub amount: f64,
    pub currency: Option<String>,
    #[serde(default)]
    pub status: InvoiceStatus,
    pub budget_period: BudgetPeriod,
    pub due_date: Option<NaiveDate>,
    pub invoice_number: Option<String>,
    pub notes: Option<String>,
}

impl NewInvoice {
    #[must_use]
    pub fn currency(&self) -> &str {
        self.currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
    }

    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for a negative or non-finite amount.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_amount(self.amount)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoicePatch {
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub budget_period: Option<BudgetPeriod>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub paid_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub invoice_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl InvoicePatch {
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for a negative or non-finite amount.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self.amount {
            Some(amount) => validate_amount(amount),
            None => Ok(()),
        }
    }

    /// Apply the patch. Moving to `paid` without an explicit paid date stamps
    /// today's date.
    #[must_use]
    pub fn apply_to(&self, invoice: &Invoice, now: DateTime<Utc>) -> Invoice {
        let mut next = invoice.clone();
        if let Some(amount) = self.amount {
            next.amount = amount;
        }
        if let Some(currency) = &self.currency {
            next.currency.clone_from(currency);
        }
        if let Some(status) = self.status {
            next.status = status;
            if status == InvoiceStatus::Paid && next.paid_date.is_none() {
                next.paid_date = Some(now.date_naive());
            }
        }
        if let Some(period) = self.budget_period {
            next.budget_period = period;
        }
        if let Some(due) = self.due_date {
            next.due_date = due;
        }
        if let Some(paid) = self.paid_date {
            next.paid_date = paid;
        }
        if let Some(number) = &self.invoice_number {
            next.invoice_number.clone_from(number);
        }
        if let Some(notes) = &self.notes {
            next.notes.clone_from(notes);
        }
        next.updated_at = now;
        next
    }
}

fn validate_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("name must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Loose shape check: something, an `@`, and a dotted domain.
///
/// # Errors
///
/// Returns [`CoreError::Validation`] when `email` does not look like an address.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if EMAIL_RE.is_match(email.trim()) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )))
    }
}

/// # Errors
///
/// Returns [`CoreError::Validation`] unless `value` parses as an absolute
/// `http` or `https` URL.
pub fn validate_http_url(field: &str, value: &str) -> Result<(), CoreError> {
    match Url::parse(value.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(CoreError::Validation(format!(
            "'{field}' must be a valid http(s) URL, got '{value}'"
        ))),
    }
}

fn validate_counts(
    impressions: i64,
    engagement: Option<i64>,
    clicks: Option<i64>,
) -> Result<(), CoreError> {
    if impressions < 0 || engagement.is_some_and(|v| v < 0) || clicks.is_some_and(|v| v < 0) {
        return Err(CoreError::Validation(
            "impressions, engagement and clicks must be non-negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_cost(cost: Option<f64>) -> Result<(), CoreError> {
    match cost {
        Some(c) if !c.is_finite() || c < 0.0 => Err(CoreError::Validation(
            "cost must be a non-negative number".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_amount(amount: f64) -> Result<(), CoreError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(CoreError::Validation(
            "amount must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

/// Present-but-null becomes `Some(None)`; pair with `#[serde(default)]` so an
/// absent field stays `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
