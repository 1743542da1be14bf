//! In-memory roster used when no database is configured.
//!
//! Ids and timestamps are generated locally. Nothing survives a restart.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use koltrack_core::{
    demo_roster, ContentPost, CoreError, CreateKol, DemoKol, DocumentType, Invoice, InvoicePatch,
    InvoiceStatus, Kol, KolDocument, KolProfile, NewDocument, NewInvoice, NewPlatformLink,
    NewPost, PlatformLink, PostPatch, UpdateKol,
};
use uuid::Uuid;

use crate::ServiceError;

#[derive(Debug, Default)]
pub struct StaticDataSource {
    state: Mutex<StaticState>,
}

#[derive(Debug, Default)]
struct StaticState {
    /// Newest first, matching the database listing order.
    kols: Vec<Kol>,
    invoices: Vec<Invoice>,
}

impl StaticState {
    fn position(&self, kol_id: Uuid) -> Result<usize, ServiceError> {
        self.kols
            .iter()
            .position(|k| k.id() == kol_id)
            .ok_or_else(|| ServiceError::kol_not_found(kol_id))
    }
}

impl StaticDataSource {
    /// A source pre-populated with the fixed demo roster.
    #[must_use]
    pub fn demo() -> Self {
        Self::with_roster(&demo_roster())
    }

    /// Load `entries` in order through the regular create calls. Entries that
    /// fail validation are skipped with a warning.
    #[must_use]
    pub fn with_roster(entries: &[DemoKol]) -> Self {
        let source = Self::default();
        for entry in entries {
            if let Err(error) = source.seed_entry(entry) {
                tracing::warn!(name = %entry.kol.name, error = %error, "skipping demo entry");
            }
        }
        source
    }

    fn seed_entry(&self, entry: &DemoKol) -> Result<(), ServiceError> {
        let kol = self.create_kol(&entry.kol)?;
        for post in &entry.posts {
            self.create_post(kol.id(), post)?;
        }
        for invoice in &entry.invoices {
            self.create_invoice(&invoice.for_kol(kol.id()))?;
        }
        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, StaticState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn fetch_roster(&self) -> Vec<Kol> {
        self.state().kols.clone()
    }

    pub(crate) fn create_kol(&self, intent: &CreateKol) -> Result<Kol, ServiceError> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let profile = KolProfile {
            id,
            name: intent.display_name().to_string(),
            email: intent.email.clone(),
            telegram_handle: intent.telegram_handle.clone(),
            notes: intent.notes.clone(),
            status: intent.status,
            kyc_completed: intent.kyc_completed,
            created_at: now,
            updated_at: now,
        };
        let platforms = build_links(id, &intent.platforms)?;
        let documents = build_documents(id, &intent.documents, now);
        let kol = Kol::new(profile, platforms, Vec::new(), documents);
        self.state().kols.insert(0, kol.clone());
        Ok(kol)
    }

    pub(crate) fn update_kol(
        &self,
        kol_id: Uuid,
        patch: &UpdateKol,
    ) -> Result<Option<Kol>, ServiceError> {
        let mut state = self.state();
        let Some(pos) = state.kols.iter().position(|k| k.id() == kol_id) else {
            return Ok(None);
        };
        let current = &state.kols[pos];
        let mut next = current.with_profile(patch.apply_to(current.profile(), Utc::now()));
        if let Some(links) = &patch.platforms {
            next = next.with_platforms(build_links(kol_id, links)?);
        }
        state.kols[pos] = next.clone();
        Ok(Some(next))
    }

    pub(crate) fn delete_kol(&self, kol_id: Uuid) -> bool {
        let mut state = self.state();
        let before = state.kols.len();
        state.kols.retain(|k| k.id() != kol_id);
        state.invoices.retain(|i| i.kol_id != kol_id);
        state.kols.len() != before
    }

    pub(crate) fn replace_platforms(
        &self,
        kol_id: Uuid,
        links: &[NewPlatformLink],
    ) -> Result<Vec<PlatformLink>, ServiceError> {
        let mut state = self.state();
        let pos = state.position(kol_id)?;
        let links = build_links(kol_id, links)?;
        state.kols[pos] = state.kols[pos].with_platforms(links.clone());
        Ok(links)
    }

    pub(crate) fn create_post(
        &self,
        kol_id: Uuid,
        post: &NewPost,
    ) -> Result<ContentPost, ServiceError> {
        let mut state = self.state();
        let pos = state.position(kol_id)?;
        let platform = post
            .resolved_platform()
            .ok_or_else(|| CoreError::InvalidPlatform(post.url.clone()))?;
        let now = Utc::now();
        let created = ContentPost {
            id: Uuid::new_v4(),
            kol_id,
            platform,
            url: post.url.clone(),
            title: post.title.clone(),
            posted_date: post.posted_date,
            impressions: post.impressions,
            engagement: post.engagement,
            clicks: post.clicks,
            cost: post.cost,
            notes: post.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        let mut posts = state.kols[pos].posts().to_vec();
        posts.push(created.clone());
        state.kols[pos] = state.kols[pos].with_posts(posts);
        Ok(created)
    }

    pub(crate) fn update_post(
        &self,
        kol_id: Uuid,
        post_id: Uuid,
        patch: &PostPatch,
    ) -> Option<ContentPost> {
        let mut state = self.state();
        let pos = state.position(kol_id).ok()?;
        let mut posts = state.kols[pos].posts().to_vec();
        let slot = posts.iter_mut().find(|p| p.id == post_id)?;
        *slot = patch.apply_to(slot, Utc::now());
        let updated = slot.clone();
        state.kols[pos] = state.kols[pos].with_posts(posts);
        Some(updated)
    }

    pub(crate) fn delete_post(&self, kol_id: Uuid, post_id: Uuid) -> bool {
        let mut state = self.state();
        let Ok(pos) = state.position(kol_id) else {
            return false;
        };
        let mut posts = state.kols[pos].posts().to_vec();
        let before = posts.len();
        posts.retain(|p| p.id != post_id);
        if posts.len() == before {
            return false;
        }
        state.kols[pos] = state.kols[pos].with_posts(posts);
        true
    }

    pub(crate) fn create_documents(
        &self,
        kol_id: Uuid,
        documents: &[NewDocument],
    ) -> Result<Vec<KolDocument>, ServiceError> {
        let mut state = self.state();
        let pos = state.position(kol_id)?;
        let created = build_documents(kol_id, documents, Utc::now());
        let mut all = state.kols[pos].documents().to_vec();
        all.extend(created.iter().cloned());
        state.kols[pos] = state.kols[pos].with_documents(all);
        Ok(created)
    }

    pub(crate) fn retype_document(
        &self,
        kol_id: Uuid,
        document_id: Uuid,
        doc_type: DocumentType,
    ) -> Option<KolDocument> {
        let mut state = self.state();
        let pos = state.position(kol_id).ok()?;
        let mut documents = state.kols[pos].documents().to_vec();
        let slot = documents.iter_mut().find(|d| d.id == document_id)?;
        slot.doc_type = doc_type;
        let updated = slot.clone();
        state.kols[pos] = state.kols[pos].with_documents(documents);
        Some(updated)
    }

    pub(crate) fn delete_document(&self, kol_id: Uuid, document_id: Uuid) -> bool {
        let mut state = self.state();
        let Ok(pos) = state.position(kol_id) else {
            return false;
        };
        let mut documents = state.kols[pos].documents().to_vec();
        let before = documents.len();
        documents.retain(|d| d.id != document_id);
        if documents.len() == before {
            return false;
        }
        state.kols[pos] = state.kols[pos].with_documents(documents);
        true
    }

    pub(crate) fn list_invoices(&self, kol_id: Option<Uuid>) -> Vec<Invoice> {
        self.state()
            .invoices
            .iter()
            .filter(|i| kol_id.is_none_or(|id| i.kol_id == id))
            .cloned()
            .collect()
    }

    pub(crate) fn create_invoice(&self, invoice: &NewInvoice) -> Result<Invoice, ServiceError> {
        let mut state = self.state();
        state.position(invoice.kol_id)?;
        let now = Utc::now();
        let created = Invoice {
            id: Uuid::new_v4(),
            kol_id: invoice.kol_id,
            amount: invoice.amount,
            currency: invoice.currency().to_string(),
            status: invoice.status,
            budget_period: invoice.budget_period,
            due_date: invoice.due_date,
            paid_date: (invoice.status == InvoiceStatus::Paid).then(|| now.date_naive()),
            invoice_number: invoice.invoice_number.clone(),
            notes: invoice.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        state.invoices.insert(0, created.clone());
        Ok(created)
    }

    pub(crate) fn update_invoice(&self, invoice_id: Uuid, patch: &InvoicePatch) -> Option<Invoice> {
        let mut state = self.state();
        let slot = state.invoices.iter_mut().find(|i| i.id == invoice_id)?;
        *slot = patch.apply_to(slot, Utc::now());
        Some(slot.clone())
    }

    pub(crate) fn delete_invoice(&self, invoice_id: Uuid) -> bool {
        let mut state = self.state();
        let before = state.invoices.len();
        state.invoices.retain(|i| i.id != invoice_id);
        state.invoices.len() != before
    }
}

fn build_links(kol_id: Uuid, links: &[NewPlatformLink]) -> Result<Vec<PlatformLink>, CoreError> {
    links
        .iter()
        .map(|link| {
            let platform = link
                .resolved_platform()
                .ok_or_else(|| CoreError::InvalidPlatform(link.profile_url.clone()))?;
            Ok(PlatformLink {
                id: Uuid::new_v4(),
                kol_id,
                platform,
                profile_url: link.profile_url.clone(),
                follower_count: link.follower_count,
                username: link.username.clone(),
            })
        })
        .collect()
}

fn build_documents(kol_id: Uuid, documents: &[NewDocument], now: DateTime<Utc>) -> Vec<KolDocument> {
    documents
        .iter()
        .map(|doc| KolDocument {
            id: Uuid::new_v4(),
            kol_id,
            name: doc.name.clone(),
            doc_type: doc.resolved_type(),
            size: doc.size.max(0),
            url: doc.url.clone(),
            file_path: doc.file_path.clone(),
            notes: doc.notes.clone(),
            uploaded_at: now,
        })
        .collect()
}
