//! Tracked influencer ("KOL") records and their child collections.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metrics::{self, KolMetrics};
use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Tiktok,
    Twitter,
    Instagram,
    Telegram,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Youtube,
        Platform::Tiktok,
        Platform::Twitter,
        Platform::Instagram,
        Platform::Telegram,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Tiktok => "tiktok",
            Platform::Twitter => "twitter",
            Platform::Instagram => "instagram",
            Platform::Telegram => "telegram",
        }
    }

    /// Guess the platform from a profile or post URL by its host name.
    ///
    /// Returns `None` for hosts that do not belong to a tracked platform or for
    /// strings without a recognisable host.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let trimmed = url.trim();
        let without_scheme = trimmed
            .split_once("://")
            .map_or(trimmed, |(_, rest)| rest);
        let host = without_scheme
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default()
            .rsplit('@')
            .next()
            .unwrap_or_default()
            .split(':')
            .next()
            .unwrap_or_default()
            .to_lowercase();

        if host.is_empty() {
            return None;
        }
        if host.contains("youtube") || host.contains("youtu.be") {
            Some(Platform::Youtube)
        } else if host.contains("tiktok") {
            Some(Platform::Tiktok)
        } else if host.contains("twitter") || host == "x.com" || host.ends_with(".x.com") {
            Some(Platform::Twitter)
        } else if host.contains("instagram") {
            Some(Platform::Instagram)
        } else if host.contains("telegram") || host == "t.me" || host.ends_with(".t.me") {
            Some(Platform::Telegram)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::InvalidPlatform(s.to_string()))
    }
}

/// Partnership lifecycle stage. Declaration order is the lifecycle order;
/// `NotPaid` is the terminal failure state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum KolStatus {
    #[default]
    Reached,
    InContact,
    Kyc,
    Contracted,
    Invoiced,
    Paid,
    NotPaid,
}

impl KolStatus {
    pub const ALL: [KolStatus; 7] = [
        KolStatus::Reached,
        KolStatus::InContact,
        KolStatus::Kyc,
        KolStatus::Contracted,
        KolStatus::Invoiced,
        KolStatus::Paid,
        KolStatus::NotPaid,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            KolStatus::Reached => "reached",
            KolStatus::InContact => "in_contact",
            KolStatus::Kyc => "kyc",
            KolStatus::Contracted => "contracted",
            KolStatus::Invoiced => "invoiced",
            KolStatus::Paid => "paid",
            KolStatus::NotPaid => "not_paid",
        }
    }

    #[must_use]
    pub fn is_terminal_failure(self) -> bool {
        self == KolStatus::NotPaid
    }
}

impl std::fmt::Display for KolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KolStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KolStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::InvalidStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Invoice,
    Msa,
    Contract,
    Other,
}

impl DocumentType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Msa => "msa",
            DocumentType::Contract => "contract",
            DocumentType::Other => "other",
        }
    }

    /// Default document type for an uploaded file, guessed from its name.
    ///
    /// Checked in order: invoice, msa, contract. Anything unmatched is `Other`.
    #[must_use]
    pub fn infer_from_filename(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        if lower.contains("invoice") || lower.contains("inv_") || lower.contains("bill") {
            DocumentType::Invoice
        } else if lower.contains("msa") || lower.contains("master service") {
            DocumentType::Msa
        } else if lower.contains("contract") || lower.contains("agreement") || lower.contains("agmt")
        {
            DocumentType::Contract
        } else {
            DocumentType::Other
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoice" => Ok(DocumentType::Invoice),
            "msa" => Ok(DocumentType::Msa),
            "contract" => Ok(DocumentType::Contract),
            "other" => Ok(DocumentType::Other),
            other => Err(CoreError::InvalidDocumentType(other.to_string())),
        }
    }
}

/// Identity and contact fields of a KOL, without child collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KolProfile {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub telegram_handle: Option<String>,
    pub notes: Option<String>,
    pub status: KolStatus,
    /// Compliance (KYC) checks completed.
    pub kyc_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformLink {
    pub id: Uuid,
    pub kol_id: Uuid,
    pub platform: Platform,
    pub profile_url: String,
    pub follower_count: i64,
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPost {
    pub id: Uuid,
    pub kol_id: Uuid,
    pub platform: Platform,
    pub url: String,
    pub title: Option<String>,
    pub posted_date: NaiveDate,
    pub impressions: i64,
    pub engagement: Option<i64>,
    pub clicks: Option<i64>,
    /// Spend attributed to this post, in the roster's reporting currency.
    pub cost: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KolDocument {
    pub id: Uuid,
    pub kol_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    /// Size in bytes.
    pub size: i64,
    pub url: Option<String>,
    pub file_path: Option<String>,
    pub notes: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// A KOL together with its children and the metrics derived from them.
///
/// The metrics are computed when the value is built and every constructor goes
/// through [`Kol::new`], so they always match the current platform and post
/// lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kol {
    #[serde(flatten)]
    profile: KolProfile,
    platforms: Vec<PlatformLink>,
    posts: Vec<ContentPost>,
    documents: Vec<KolDocument>,
    #[serde(flatten)]
    metrics: KolMetrics,
}

impl Kol {
    #[must_use]
    pub fn new(
        profile: KolProfile,
        platforms: Vec<PlatformLink>,
        posts: Vec<ContentPost>,
        documents: Vec<KolDocument>,
    ) -> Self {
        let metrics = metrics::metrics_from_parts(&platforms, &posts);
        Self {
            profile,
            platforms,
            posts,
            documents,
            metrics,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.profile.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.profile.name
    }

    #[must_use]
    pub fn profile(&self) -> &KolProfile {
        &self.profile
    }

    #[must_use]
    pub fn platforms(&self) -> &[PlatformLink] {
        &self.platforms
    }

    #[must_use]
    pub fn posts(&self) -> &[ContentPost] {
        &self.posts
    }

    #[must_use]
    pub fn documents(&self) -> &[KolDocument] {
        &self.documents
    }

    #[must_use]
    pub fn metrics(&self) -> &KolMetrics {
        &self.metrics
    }

    /// Same KOL with a different post list; metrics are recomputed.
    #[must_use]
    pub fn with_posts(&self, posts: Vec<ContentPost>) -> Self {
        Self::new(
            self.profile.clone(),
            self.platforms.clone(),
            posts,
            self.documents.clone(),
        )
    }

    /// Same KOL with a different platform set; metrics are recomputed.
    #[must_use]
    pub fn with_platforms(&self, platforms: Vec<PlatformLink>) -> Self {
        Self::new(
            self.profile.clone(),
            platforms,
            self.posts.clone(),
            self.documents.clone(),
        )
    }

    /// Same KOL with a different document list. Documents never feed metrics,
    /// so the current metrics are carried over.
    #[must_use]
    pub fn with_documents(&self, documents: Vec<KolDocument>) -> Self {
        Self {
            profile: self.profile.clone(),
            platforms: self.platforms.clone(),
            posts: self.posts.clone(),
            documents,
            metrics: self.metrics,
        }
    }

    /// Same KOL with different identity/contact fields.
    #[must_use]
    pub fn with_profile(&self, profile: KolProfile) -> Self {
        Self {
            profile,
            platforms: self.platforms.clone(),
            posts: self.posts.clone(),
            documents: self.documents.clone(),
            metrics: self.metrics,
        }
    }

    /// Split back into parts, e.g. to rebuild after a collaborator round trip.
    #[must_use]
    pub fn into_parts(
        self,
    ) -> (
        KolProfile,
        Vec<PlatformLink>,
        Vec<ContentPost>,
        Vec<KolDocument>,
    ) {
        (self.profile, self.platforms, self.posts, self.documents)
    }
}
