use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use koltrack_core::{BudgetSummary, Invoice, InvoicePatch, NewInvoice};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_service_error, parse_id, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct InvoiceListQuery {
    pub kol_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BudgetQuery {
    /// Revenue attributed to the campaign, for the ROI figure.
    pub revenue: Option<f64>,
}

/// GET /api/v1/invoices[?kol_id=]
pub(super) async fn list_invoices(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<InvoiceListQuery>,
) -> Result<Json<ApiResponse<Vec<Invoice>>>, ApiError> {
    let invoices = state.service.list_invoices(query.kol_id).await;
    Ok(ApiResponse::new(&req_id.0, invoices))
}

/// POST /api/v1/invoices
pub(super) async fn create_invoice(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NewInvoice>,
) -> Result<(StatusCode, Json<ApiResponse<Invoice>>), ApiError> {
    let rid = &req_id.0;
    let invoice = state
        .service
        .create_invoice(&body)
        .await
        .map_err(|e| map_service_error(rid, e))?;
    Ok((StatusCode::CREATED, ApiResponse::new(rid, invoice)))
}

/// PATCH /api/v1/invoices/{invoice_id}: moving to `paid` stamps the paid date.
pub(super) async fn update_invoice(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(invoice_id): Path<String>,
    Json(body): Json<InvoicePatch>,
) -> Result<Json<ApiResponse<Invoice>>, ApiError> {
    let rid = &req_id.0;
    let invoice_id = parse_id(rid, &invoice_id)?;
    let invoice = state
        .service
        .update_invoice(invoice_id, &body)
        .await
        .map_err(|e| map_service_error(rid, e))?;
    Ok(ApiResponse::new(rid, invoice))
}

/// DELETE /api/v1/invoices/{invoice_id}
pub(super) async fn delete_invoice(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(invoice_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let invoice_id = parse_id(rid, &invoice_id)?;
    state
        .service
        .delete_invoice(invoice_id)
        .await
        .map_err(|e| map_service_error(rid, e))?;
    Ok(ApiResponse::new(rid, serde_json::json!({ "deleted": true })))
}

/// GET /api/v1/budget/summary[?revenue=]
pub(super) async fn budget_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<BudgetQuery>,
) -> Result<Json<ApiResponse<BudgetSummary>>, ApiError> {
    let summary = state.service.budget_summary(query.revenue).await;
    Ok(ApiResponse::new(&req_id.0, summary))
}
