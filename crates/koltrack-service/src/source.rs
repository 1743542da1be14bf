//! The two roster backends. One is chosen at startup and kept for the life of
//! the process.

use koltrack_core::{
    ContentPost, CreateKol, DocumentType, Invoice, InvoicePatch, Kol, KolDocument, NewDocument,
    NewInvoice, NewPlatformLink, NewPost, PlatformLink, PostPatch, UpdateKol,
};
use koltrack_db::{DocumentRow, InvoiceRow, PlatformRow};
use sqlx::PgPool;
use uuid::Uuid;

use crate::static_source::StaticDataSource;
use crate::ServiceError;

#[derive(Debug)]
pub enum DataSource {
    Static(StaticDataSource),
    Remote(RemoteDataSource),
}

/// Postgres-backed source. Every call returns the rows as stored.
#[derive(Debug, Clone)]
pub struct RemoteDataSource {
    pool: PgPool,
}

impl RemoteDataSource {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DataSource {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            DataSource::Static(_) => "static",
            DataSource::Remote(_) => "remote",
        }
    }

    /// # Errors
    ///
    /// Returns [`ServiceError::Db`] when the database cannot be reached.
    pub async fn health(&self) -> Result<(), ServiceError> {
        match self {
            DataSource::Static(_) => Ok(()),
            DataSource::Remote(r) => Ok(koltrack_db::health_check(&r.pool).await?),
        }
    }

    pub(crate) async fn fetch_roster(&self) -> Result<Vec<Kol>, ServiceError> {
        match self {
            DataSource::Static(s) => Ok(s.fetch_roster()),
            DataSource::Remote(r) => Ok(koltrack_db::fetch_roster(&r.pool).await?),
        }
    }

    pub(crate) async fn create_kol(&self, intent: &CreateKol) -> Result<Kol, ServiceError> {
        match self {
            DataSource::Static(s) => s.create_kol(intent),
            DataSource::Remote(r) => {
                let row = koltrack_db::create_kol(&r.pool, intent).await?;
                let links =
                    koltrack_db::create_platforms(&r.pool, row.id, &intent.platforms).await?;
                let documents =
                    koltrack_db::create_documents(&r.pool, row.id, &intent.documents).await?;
                Ok(Kol::new(
                    row.into_profile()?,
                    decode_links(links)?,
                    Vec::new(),
                    decode_documents(documents)?,
                ))
            }
        }
    }

    /// Apply `patch` and return the KOL as stored afterwards, or `None` if it
    /// does not exist.
    pub(crate) async fn update_kol(
        &self,
        kol_id: Uuid,
        patch: &UpdateKol,
    ) -> Result<Option<Kol>, ServiceError> {
        match self {
            DataSource::Static(s) => s.update_kol(kol_id, patch),
            DataSource::Remote(r) => {
                let exists = if patch.touches_profile() {
                    koltrack_db::update_kol(&r.pool, kol_id, patch).await?.is_some()
                } else {
                    koltrack_db::get_kol_row(&r.pool, kol_id).await?.is_some()
                };
                if !exists {
                    return Ok(None);
                }
                if let Some(links) = &patch.platforms {
                    koltrack_db::replace_platforms(&r.pool, kol_id, links).await?;
                }
                Ok(koltrack_db::fetch_kol(&r.pool, kol_id).await?)
            }
        }
    }

    pub(crate) async fn delete_kol(&self, kol_id: Uuid) -> Result<bool, ServiceError> {
        match self {
            DataSource::Static(s) => Ok(s.delete_kol(kol_id)),
            DataSource::Remote(r) => Ok(koltrack_db::delete_kol(&r.pool, kol_id).await?),
        }
    }

    pub(crate) async fn replace_platforms(
        &self,
        kol_id: Uuid,
        links: &[NewPlatformLink],
    ) -> Result<Vec<PlatformLink>, ServiceError> {
        match self {
            DataSource::Static(s) => s.replace_platforms(kol_id, links),
            DataSource::Remote(r) => {
                let rows = koltrack_db::replace_platforms(&r.pool, kol_id, links).await?;
                decode_links(rows)
            }
        }
    }

    pub(crate) async fn create_post(
        &self,
        kol_id: Uuid,
        post: &NewPost,
    ) -> Result<ContentPost, ServiceError> {
        match self {
            DataSource::Static(s) => s.create_post(kol_id, post),
            DataSource::Remote(r) => Ok(koltrack_db::create_post(&r.pool, kol_id, post)
                .await?
                .into_post()?),
        }
    }

    pub(crate) async fn update_post(
        &self,
        kol_id: Uuid,
        post_id: Uuid,
        patch: &PostPatch,
    ) -> Result<Option<ContentPost>, ServiceError> {
        match self {
            DataSource::Static(s) => Ok(s.update_post(kol_id, post_id, patch)),
            DataSource::Remote(r) => koltrack_db::update_post(&r.pool, kol_id, post_id, patch)
                .await?
                .map(|row| row.into_post().map_err(ServiceError::from))
                .transpose(),
        }
    }

    pub(crate) async fn delete_post(&self, kol_id: Uuid, post_id: Uuid) -> Result<bool, ServiceError> {
        match self {
            DataSource::Static(s) => Ok(s.delete_post(kol_id, post_id)),
            DataSource::Remote(r) => Ok(koltrack_db::delete_post(&r.pool, kol_id, post_id).await?),
        }
    }

    pub(crate) async fn create_documents(
        &self,
        kol_id: Uuid,
        documents: &[NewDocument],
    ) -> Result<Vec<KolDocument>, ServiceError> {
        match self {
            DataSource::Static(s) => s.create_documents(kol_id, documents),
            DataSource::Remote(r) => {
                let rows = koltrack_db::create_documents(&r.pool, kol_id, documents).await?;
                decode_documents(rows)
            }
        }
    }

    pub(crate) async fn retype_document(
        &self,
        kol_id: Uuid,
        document_id: Uuid,
        doc_type: DocumentType,
    ) -> Result<Option<KolDocument>, ServiceError> {
        match self {
            DataSource::Static(s) => Ok(s.retype_document(kol_id, document_id, doc_type)),
            DataSource::Remote(r) => {
                koltrack_db::retype_document(&r.pool, kol_id, document_id, doc_type)
                    .await?
                    .map(|row| row.into_document().map_err(ServiceError::from))
                    .transpose()
            }
        }
    }

    pub(crate) async fn delete_document(
        &self,
        kol_id: Uuid,
        document_id: Uuid,
    ) -> Result<bool, ServiceError> {
        match self {
            DataSource::Static(s) => Ok(s.delete_document(kol_id, document_id)),
            DataSource::Remote(r) => {
                Ok(koltrack_db::delete_document(&r.pool, kol_id, document_id).await?)
            }
        }
    }

    pub(crate) async fn list_invoices(&self) -> Result<Vec<Invoice>, ServiceError> {
        match self {
            DataSource::Static(s) => Ok(s.list_invoices(None)),
            DataSource::Remote(r) => koltrack_db::list_invoices(&r.pool, None)
                .await?
                .into_iter()
                .map(|row| row.into_invoice().map_err(ServiceError::from))
                .collect(),
        }
    }

    pub(crate) async fn create_invoice(&self, invoice: &NewInvoice) -> Result<Invoice, ServiceError> {
        match self {
            DataSource::Static(s) => s.create_invoice(invoice),
            DataSource::Remote(r) => Ok(koltrack_db::create_invoice(&r.pool, invoice)
                .await?
                .into_invoice()?),
        }
    }

    pub(crate) async fn update_invoice(
        &self,
        invoice_id: Uuid,
        patch: &InvoicePatch,
    ) -> Result<Option<Invoice>, ServiceError> {
        match self {
            DataSource::Static(s) => Ok(s.update_invoice(invoice_id, patch)),
            DataSource::Remote(r) => koltrack_db::update_invoice(&r.pool, invoice_id, patch)
                .await?
                .map(|row: InvoiceRow| row.into_invoice().map_err(ServiceError::from))
                .transpose(),
        }
    }

    pub(crate) async fn delete_invoice(&self, invoice_id: Uuid) -> Result<bool, ServiceError> {
        match self {
            DataSource::Static(s) => Ok(s.delete_invoice(invoice_id)),
            DataSource::Remote(r) => Ok(koltrack_db::delete_invoice(&r.pool, invoice_id).await?),
        }
    }
}

fn decode_links(rows: Vec<PlatformRow>) -> Result<Vec<PlatformLink>, ServiceError> {
    rows.into_iter()
        .map(|row| row.into_link().map_err(ServiceError::from))
        .collect()
}

fn decode_documents(rows: Vec<DocumentRow>) -> Result<Vec<KolDocument>, ServiceError> {
    rows.into_iter()
        .map(|row| row.into_document().map_err(ServiceError::from))
        .collect()
}
