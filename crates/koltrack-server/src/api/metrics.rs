use axum::{
    extract::{Query, State},
    Extension, Json,
};
use koltrack_core::{KolCpm, RosterMetrics};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

const MAX_TOP: usize = 100;

#[derive(Debug, Deserialize)]
pub(super) struct RosterMetricsQuery {
    pub top: Option<usize>,
}

/// GET /api/v1/metrics/roster?top=N: roster totals, platform budget split and
/// the N cheapest KOLs by CPM.
pub(super) async fn roster_metrics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RosterMetricsQuery>,
) -> Result<Json<ApiResponse<RosterMetrics>>, ApiError> {
    let top = query.top.map(|n| n.min(MAX_TOP));
    let metrics = state.service.roster_metrics(top).await;
    Ok(ApiResponse::new(&req_id.0, metrics))
}

/// GET /api/v1/metrics/cpm-by-kol: chart series, cheapest first, zero CPM
/// omitted.
pub(super) async fn cpm_by_kol(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<KolCpm>>>, ApiError> {
    let series = state.service.cpm_by_kol().await;
    Ok(ApiResponse::new(&req_id.0, series))
}
