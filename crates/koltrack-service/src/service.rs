use std::sync::Arc;

use koltrack_core::{
    apply_document_mutation, apply_platform_replace, apply_post_mutation, compute_roster_metrics,
    cpm_by_kol, insert_kol, remove_kol, replace_kol, summarize_budget, weekly_performance,
    BudgetSummary, ContentPost, CreateKol, DocumentMutation, DocumentType, ImportFile,
    ImportResult, Invoice, InvoicePatch, Kol, KolCpm, KolDocument, KolFilter, NewDocument,
    NewInvoice, NewPlatformLink, NewPost, PlatformLink, PostMutation, PostPatch, Roster,
    RosterMetrics, UpdateKol, WeeklyPerformance,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::source::DataSource;
use crate::ServiceError;

/// Owns the roster snapshot and keeps it in step with the data source.
///
/// Every mutation awaits the source first and only then takes the write lock
/// to fold the stored result into the snapshot. A failed call leaves the
/// snapshot as it was. Two concurrent writers are folded in completion order.
#[derive(Debug)]
pub struct RosterService {
    source: DataSource,
    top_n: usize,
    roster: RwLock<Roster>,
    invoices: RwLock<Vec<Invoice>>,
}

impl RosterService {
    /// The snapshot starts empty; call [`RosterService::load`] to fill it.
    #[must_use]
    pub fn new(source: DataSource, top_n: usize) -> Self {
        Self {
            source,
            top_n,
            roster: RwLock::new(Roster::default()),
            invoices: RwLock::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Replace the snapshot with a fresh bulk fetch of KOLs and invoices.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Db`] if either fetch fails.
    pub async fn load(&self) -> Result<usize, ServiceError> {
        let kols = self.source.fetch_roster().await?;
        let invoices = self.source.list_invoices().await?;
        let count = kols.len();
        // Both guards are held so readers never pair a new roster with old invoices.
        let mut roster = self.roster.write().await;
        let mut cached = self.invoices.write().await;
        *roster = Roster::new(kols);
        *cached = invoices;
        drop(cached);
        drop(roster);
        tracing::info!(kols = count, source = self.source.kind(), "roster loaded");
        Ok(count)
    }

    /// # Errors
    ///
    /// Returns [`ServiceError::Db`] when the data source is unreachable.
    pub async fn health(&self) -> Result<(), ServiceError> {
        self.source.health().await
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn snapshot(&self) -> Roster {
        self.roster.read().await.clone()
    }

    pub async fn kol(&self, kol_id: Uuid) -> Option<Arc<Kol>> {
        self.roster.read().await.get_shared(kol_id)
    }

    pub async fn list_kols(&self, filter: &KolFilter) -> Vec<Arc<Kol>> {
        self.roster.read().await.filter(filter)
    }

    /// Roster aggregates with `top` performers, or the configured default.
    pub async fn roster_metrics(&self, top: Option<usize>) -> RosterMetrics {
        let roster = self.roster.read().await;
        compute_roster_metrics(roster.iter(), top.unwrap_or(self.top_n))
    }

    pub async fn cpm_by_kol(&self) -> Vec<KolCpm> {
        cpm_by_kol(self.roster.read().await.iter())
    }

    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the KOL is not in the roster.
    pub async fn weekly_performance(
        &self,
        kol_id: Uuid,
    ) -> Result<Vec<WeeklyPerformance>, ServiceError> {
        let kol = self.require_kol(kol_id).await?;
        Ok(weekly_performance(kol.posts()))
    }

    pub async fn list_invoices(&self, kol_id: Option<Uuid>) -> Vec<Invoice> {
        self.invoices
            .read()
            .await
            .iter()
            .filter(|i| kol_id.is_none_or(|id| i.kol_id == id))
            .cloned()
            .collect()
    }

    pub async fn budget_summary(&self, revenue: Option<f64>) -> BudgetSummary {
        summarize_budget(&self.invoices.read().await, revenue)
    }

    // -----------------------------------------------------------------------
    // KOLs
    // -----------------------------------------------------------------------

    /// Against the database the profile row, platforms and documents are
    /// separate writes. If a later write fails the profile row stays committed
    /// but the snapshot does not include it until the next [`Self::load`].
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for an invalid intent and
    /// [`ServiceError::Db`] if storing it fails.
    pub async fn create_kol(&self, intent: &CreateKol) -> Result<Arc<Kol>, ServiceError> {
        intent.validate()?;
        let kol = self.source.create_kol(intent).await?;
        let kol_id = kol.id();
        let mut roster = self.roster.write().await;
        *roster = insert_kol(&roster, kol);
        tracing::info!(kol_id = %kol_id, "kol created");
        roster
            .get_shared(kol_id)
            .ok_or_else(|| ServiceError::kol_not_found(kol_id))
    }

    /// Update profile fields and, when `patch.platforms` is present, replace
    /// the platform set wholesale. The stored KOL is refetched afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`], [`ServiceError::Validation`] or
    /// [`ServiceError::Db`].
    pub async fn update_kol(&self, kol_id: Uuid, patch: &UpdateKol) -> Result<Arc<Kol>, ServiceError> {
        patch.validate()?;
        self.require_kol(kol_id).await?;
        let kol = self
            .source
            .update_kol(kol_id, patch)
            .await?
            .ok_or_else(|| ServiceError::kol_not_found(kol_id))?;
        let mut roster = self.roster.write().await;
        *roster = replace_kol(&roster, kol);
        tracing::info!(kol_id = %kol_id, "kol updated");
        roster
            .get_shared(kol_id)
            .ok_or_else(|| ServiceError::kol_not_found(kol_id))
    }

    /// Delete a KOL with its children and invoices.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] or [`ServiceError::Db`].
    pub async fn delete_kol(&self, kol_id: Uuid) -> Result<(), ServiceError> {
        self.require_kol(kol_id).await?;
        if !self.source.delete_kol(kol_id).await? {
            return Err(ServiceError::kol_not_found(kol_id));
        }
        {
            let mut roster = self.roster.write().await;
            let mut invoices = self.invoices.write().await;
            *roster = remove_kol(&roster, kol_id);
            invoices.retain(|i| i.kol_id != kol_id);
        }
        tracing::info!(kol_id = %kol_id, "kol deleted");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`], [`ServiceError::Validation`] or
    /// [`ServiceError::Db`].
    pub async fn replace_platforms(
        &self,
        kol_id: Uuid,
        links: &[NewPlatformLink],
    ) -> Result<Vec<PlatformLink>, ServiceError> {
        for link in links {
            link.validate()?;
        }
        self.require_kol(kol_id).await?;
        let stored = self.source.replace_platforms(kol_id, links).await?;
        let mut roster = self.roster.write().await;
        *roster = apply_platform_replace(&roster, kol_id, stored.clone());
        tracing::info!(kol_id = %kol_id, links = stored.len(), "platforms replaced");
        Ok(stored)
    }

    // -----------------------------------------------------------------------
    // Posts
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`], [`ServiceError::Validation`] or
    /// [`ServiceError::Db`].
    pub async fn add_post(&self, kol_id: Uuid, post: &NewPost) -> Result<ContentPost, ServiceError> {
        post.validate()?;
        self.require_kol(kol_id).await?;
        let stored = self.source.create_post(kol_id, post).await?;
        self.fold_post(kol_id, PostMutation::Add(stored.clone())).await;
        tracing::info!(kol_id = %kol_id, post_id = %stored.id, "post added");
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`], [`ServiceError::Validation`] or
    /// [`ServiceError::Db`].
    pub async fn update_post(
        &self,
        kol_id: Uuid,
        post_id: Uuid,
        patch: &PostPatch,
    ) -> Result<ContentPost, ServiceError> {
        patch.validate()?;
        self.require_kol(kol_id).await?;
        let stored = self
            .source
            .update_post(kol_id, post_id, patch)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "post",
                id: post_id,
            })?;
        self.fold_post(kol_id, PostMutation::Update(stored.clone())).await;
        tracing::info!(kol_id = %kol_id, post_id = %post_id, "post updated");
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] or [`ServiceError::Db`].
    pub async fn delete_post(&self, kol_id: Uuid, post_id: Uuid) -> Result<(), ServiceError> {
        self.require_kol(kol_id).await?;
        if !self.source.delete_post(kol_id, post_id).await? {
            return Err(ServiceError::NotFound {
                entity: "post",
                id: post_id,
            });
        }
        self.fold_post(kol_id, PostMutation::Delete(post_id)).await;
        tracing::info!(kol_id = %kol_id, post_id = %post_id, "post deleted");
        Ok(())
    }

    async fn fold_post(&self, kol_id: Uuid, mutation: PostMutation) {
        let mut roster = self.roster.write().await;
        *roster = apply_post_mutation(&roster, kol_id, mutation);
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] or [`ServiceError::Db`].
    pub async fn add_documents(
        &self,
        kol_id: Uuid,
        documents: &[NewDocument],
    ) -> Result<Vec<KolDocument>, ServiceError> {
        for document in documents {
            document.validate()?;
        }
        self.require_kol(kol_id).await?;
        let stored = self.source.create_documents(kol_id, documents).await?;
        self.fold_document(kol_id, DocumentMutation::Add(stored.clone()))
            .await;
        tracing::info!(kol_id = %kol_id, documents = stored.len(), "documents added");
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] or [`ServiceError::Db`].
    pub async fn retype_document(
        &self,
        kol_id: Uuid,
        document_id: Uuid,
        doc_type: DocumentType,
    ) -> Result<KolDocument, ServiceError> {
        self.require_kol(kol_id).await?;
        let stored = self
            .source
            .retype_document(kol_id, document_id, doc_type)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "document",
                id: document_id,
            })?;
        self.fold_document(
            kol_id,
            DocumentMutation::Retype {
                document_id,
                doc_type: stored.doc_type,
            },
        )
        .await;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] or [`ServiceError::Db`].
    pub async fn delete_document(&self, kol_id: Uuid, document_id: Uuid) -> Result<(), ServiceError> {
        self.require_kol(kol_id).await?;
        if !self.source.delete_document(kol_id, document_id).await? {
            return Err(ServiceError::NotFound {
                entity: "document",
                id: document_id,
            });
        }
        self.fold_document(kol_id, DocumentMutation::Delete(document_id))
            .await;
        Ok(())
    }

    async fn fold_document(&self, kol_id: Uuid, mutation: DocumentMutation) {
        let mut roster = self.roster.write().await;
        *roster = apply_document_mutation(&roster, kol_id, mutation);
    }

    // -----------------------------------------------------------------------
    // Invoices
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for an unknown KOL,
    /// [`ServiceError::Validation`] or [`ServiceError::Db`].
    pub async fn create_invoice(&self, invoice: &NewInvoice) -> Result<Invoice, ServiceError> {
        invoice.validate()?;
        self.require_kol(invoice.kol_id).await?;
        let stored = self.source.create_invoice(invoice).await?;
        self.invoices.write().await.insert(0, stored.clone());
        tracing::info!(invoice_id = %stored.id, kol_id = %stored.kol_id, "invoice created");
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`], [`ServiceError::Validation`] or
    /// [`ServiceError::Db`].
    pub async fn update_invoice(
        &self,
        invoice_id: Uuid,
        patch: &InvoicePatch,
    ) -> Result<Invoice, ServiceError> {
        patch.validate()?;
        let not_found = ServiceError::NotFound {
            entity: "invoice",
            id: invoice_id,
        };
        let stored = self
            .source
            .update_invoice(invoice_id, patch)
            .await?
            .ok_or(not_found)?;
        if let Some(slot) = self
            .invoices
            .write()
            .await
            .iter_mut()
            .find(|i| i.id == invoice_id)
        {
            *slot = stored.clone();
        }
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] or [`ServiceError::Db`].
    pub async fn delete_invoice(&self, invoice_id: Uuid) -> Result<(), ServiceError> {
        if !self.source.delete_invoice(invoice_id).await? {
            return Err(ServiceError::NotFound {
                entity: "invoice",
                id: invoice_id,
            });
        }
        self.invoices.write().await.retain(|i| i.id != invoice_id);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Import
    // -----------------------------------------------------------------------

    /// Submit every row through [`RosterService::create_kol`], one at a time.
    /// A failing row is recorded and the rest still run.
    pub async fn import(&self, file: ImportFile) -> ImportResult {
        let mut result = ImportResult::default();
        for (index, row) in file.kols.into_iter().enumerate() {
            let row_number = index + 1;
            let prepared = match row.prepare() {
                Ok(prepared) => prepared,
                Err(message) => {
                    result.record_failure(row_number, message);
                    continue;
                }
            };
            match self.create_kol(&prepared.intent).await {
                Ok(kol) => {
                    result.record_imported(kol.id());
                    result.record_warnings(row_number, prepared.warnings);
                }
                Err(error) => {
                    tracing::warn!(row = row_number, error = %error, "import row failed");
                    result.record_failure(row_number, error.to_string());
                }
            }
        }
        tracing::info!(
            imported = result.imported_count,
            failed = result.failed_count,
            "import finished"
        );
        result
    }

    async fn require_kol(&self, kol_id: Uuid) -> Result<Arc<Kol>, ServiceError> {
        self.kol(kol_id)
            .await
            .ok_or_else(|| ServiceError::kol_not_found(kol_id))
    }
}
