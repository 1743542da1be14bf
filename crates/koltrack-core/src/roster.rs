//! Immutable roster snapshots and the mutations that produce new ones.
//!
//! Every function here takes a snapshot by reference and returns a new one.
//! KOLs are held behind `Arc`, so entries the mutation does not touch are
//! shared with the previous snapshot instead of copied. A mutation that names a
//! KOL absent from the snapshot returns the snapshot unchanged: the caller's
//! view may lag the backing store for a moment, and that is not an error here.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::kol::{ContentPost, DocumentType, Kol, KolDocument, KolStatus, Platform, PlatformLink};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    kols: Vec<Arc<Kol>>,
}

impl Roster {
    #[must_use]
    pub fn new(kols: Vec<Kol>) -> Self {
        Self {
            kols: kols.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Kol> {
        self.kols.iter().map(|k| &**k)
    }

    #[must_use]
    pub fn get(&self, kol_id: Uuid) -> Option<&Kol> {
        self.iter().find(|k| k.id() == kol_id)
    }

    /// Shared handle to a KOL, for callers that outlive the snapshot borrow.
    #[must_use]
    pub fn get_shared(&self, kol_id: Uuid) -> Option<Arc<Kol>> {
        self.kols.iter().find(|k| k.id() == kol_id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.kols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kols.is_empty()
    }

    /// KOLs matching `filter`, in roster order.
    #[must_use]
    pub fn filter(&self, filter: &KolFilter) -> Vec<Arc<Kol>> {
        self.kols
            .iter()
            .filter(|k| filter.matches(k))
            .cloned()
            .collect()
    }

    /// Rebuild the entry for `kol_id` with `f`, sharing every other entry.
    fn map_kol(&self, kol_id: Uuid, f: impl FnOnce(&Kol) -> Kol) -> Roster {
        let Some(pos) = self.kols.iter().position(|k| k.id() == kol_id) else {
            return self.clone();
        };
        let mut kols = self.kols.clone();
        kols[pos] = Arc::new(f(&self.kols[pos]));
        Roster { kols }
    }
}

#[derive(Debug, Clone)]
pub enum PostMutation {
    Add(ContentPost),
    /// Replace the post with the same id. Unknown post ids leave the list as is.
    Update(ContentPost),
    Delete(Uuid),
}

#[derive(Debug, Clone)]
pub enum DocumentMutation {
    Add(Vec<KolDocument>),
    Delete(Uuid),
    /// User override of a document's type.
    Retype {
        document_id: Uuid,
        doc_type: DocumentType,
    },
}

/// Apply a post change to one KOL and recompute its metrics from the resulting
/// post list.
#[must_use]
pub fn apply_post_mutation(roster: &Roster, kol_id: Uuid, mutation: PostMutation) -> Roster {
    roster.map_kol(kol_id, |kol| {
        let mut posts = kol.posts().to_vec();
        match mutation {
            PostMutation::Add(post) => posts.push(post),
            PostMutation::Update(post) => {
                if let Some(slot) = posts.iter_mut().find(|p| p.id == post.id) {
                    *slot = post;
                }
            }
            PostMutation::Delete(post_id) => posts.retain(|p| p.id != post_id),
        }
        kol.with_posts(posts)
    })
}

/// Replace a KOL's whole platform set. Old links are dropped, never merged.
#[must_use]
pub fn apply_platform_replace(roster: &Roster, kol_id: Uuid, links: Vec<PlatformLink>) -> Roster {
    roster.map_kol(kol_id, |kol| kol.with_platforms(links))
}

/// Apply a document change. Metrics are untouched.
#[must_use]
pub fn apply_document_mutation(
    roster: &Roster,
    kol_id: Uuid,
    mutation: DocumentMutation,
) -> Roster {
    roster.map_kol(kol_id, |kol| {
        let mut documents = kol.documents().to_vec();
        match mutation {
            DocumentMutation::Add(added) => documents.extend(added),
            DocumentMutation::Delete(document_id) => documents.retain(|d| d.id != document_id),
            DocumentMutation::Retype {
                document_id,
                doc_type,
            } => {
                if let Some(doc) = documents.iter_mut().find(|d| d.id == document_id) {
                    doc.doc_type = doc_type;
                }
            }
        }
        kol.with_documents(documents)
    })
}

/// Add a newly created KOL at the front of the roster (newest first).
#[must_use]
pub fn insert_kol(roster: &Roster, kol: Kol) -> Roster {
    let mut kols = Vec::with_capacity(roster.kols.len() + 1);
    kols.push(Arc::new(kol));
    kols.extend(roster.kols.iter().cloned());
    Roster { kols }
}

/// Swap in an authoritative copy of an existing KOL, keeping its position.
#[must_use]
pub fn replace_kol(roster: &Roster, kol: Kol) -> Roster {
    let kol_id = kol.id();
    roster.map_kol(kol_id, move |_| kol)
}

#[must_use]
pub fn remove_kol(roster: &Roster, kol_id: Uuid) -> Roster {
    Roster {
        kols: roster
            .kols
            .iter()
            .filter(|k| k.id() != kol_id)
            .cloned()
            .collect(),
    }
}

/// Roster list filter. Empty criteria match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KolFilter {
    /// Case-insensitive substring of the KOL name.
    pub search: Option<String>,
    #[serde(default)]
    pub statuses: Vec<KolStatus>,
    /// Matches KOLs with a link on any of these platforms.
    #[serde(default)]
    pub platforms: Vec<Platform>,
}

impl KolFilter {
    #[must_use]
    pub fn matches(&self, kol: &Kol) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim) {
            if !search.is_empty() && !kol.name().to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&kol.profile().status) {
            return false;
        }
        if !self.platforms.is_empty()
            && !kol
                .platforms()
                .iter()
                .any(|l| self.platforms.contains(&l.platform))
        {
            return false;
        }
        true
    }
}
