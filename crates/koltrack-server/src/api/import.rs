use axum::{extract::State, Extension, Json};
use koltrack_core::{ImportFile, ImportResult};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

/// POST /api/v1/import: rows are created one by one; a bad row is reported
/// in the result and does not stop the rest.
pub(super) async fn import_kols(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ImportFile>,
) -> Result<Json<ApiResponse<ImportResult>>, ApiError> {
    let rid = &req_id.0;
    tracing::info!(request_id = %rid, rows = body.kols.len(), "import requested");
    let result = state.service.import(body).await;
    Ok(ApiResponse::new(rid, result))
}
