//! Document metadata handlers. File bytes are stored elsewhere; only the name,
//! type, size and location are tracked here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use koltrack_core::{DocumentPatch, KolDocument, NewDocument};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_service_error, parse_id, validate, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct AddDocumentsRequest {
    pub documents: Vec<NewDocument>,
}

/// POST /api/v1/kols/{kol_id}/documents: a missing type is inferred from the
/// file name.
pub(super) async fn create_documents(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(kol_id): Path<String>,
    Json(body): Json<AddDocumentsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<KolDocument>>>), ApiError> {
    let rid = &req_id.0;
    let kol_id = parse_id(rid, &kol_id)?;
    for doc in &body.documents {
        validate::name(rid, &doc.name)?;
        if let Some(ref url) = doc.url {
            validate::url(rid, "url", url)?;
        }
    }

    let documents = state
        .service
        .add_documents(kol_id, &body.documents)
        .await
        .map_err(|e| map_service_error(rid, e))?;
    Ok((StatusCode::CREATED, ApiResponse::new(rid, documents)))
}

/// PATCH /api/v1/kols/{kol_id}/documents/{document_id}: override the type.
pub(super) async fn update_document(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((kol_id, document_id)): Path<(String, String)>,
    Json(body): Json<DocumentPatch>,
) -> Result<Json<ApiResponse<KolDocument>>, ApiError> {
    let rid = &req_id.0;
    let kol_id = parse_id(rid, &kol_id)?;
    let document_id = parse_id(rid, &document_id)?;

    let document = state
        .service
        .retype_document(kol_id, document_id, body.doc_type)
        .await
        .map_err(|e| map_service_error(rid, e))?;
    Ok(ApiResponse::new(rid, document))
}

/// DELETE /api/v1/kols/{kol_id}/documents/{document_id}
pub(super) async fn delete_document(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((kol_id, document_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let kol_id = parse_id(rid, &kol_id)?;
    let document_id = parse_id(rid, &document_id)?;

    state
        .service
        .delete_document(kol_id, document_id)
        .await
        .map_err(|e| map_service_error(rid, e))?;
    Ok(ApiResponse::new(rid, serde_json::json!({ "deleted": true })))
}
