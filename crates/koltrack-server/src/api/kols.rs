//! KOL roster handlers.
//!
//! - `GET    /api/v1/kols`                    : filtered roster list
//! - `POST   /api/v1/kols`                    : create with platforms and documents
//! - `GET    /api/v1/kols/{kol_id}`           : one KOL with derived metrics
//! - `PATCH  /api/v1/kols/{kol_id}`           : sparse profile update
//! - `DELETE /api/v1/kols/{kol_id}`           : delete with children
//! - `PUT    /api/v1/kols/{kol_id}/platforms` : wholesale platform replacement
//! - `GET    /api/v1/kols/{kol_id}/performance`  weekly post buckets

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use koltrack_core::{
    CreateKol, Kol, KolFilter, KolStatus, NewPlatformLink, Platform, PlatformLink, UpdateKol,
    WeeklyPerformance,
};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_service_error, parse_id, validate, ApiError, ApiResponse, AppState};

#[derive(Debug, Default, Deserialize)]
pub(super) struct KolListQuery {
    pub search: Option<String>,
    /// Comma-separated statuses, e.g. `paid,invoiced`.
    pub status: Option<String>,
    /// Comma-separated platforms, e.g. `youtube,tiktok`.
    pub platform: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ReplacePlatformsRequest {
    pub platforms: Vec<NewPlatformLink>,
}

fn parse_list<T: std::str::FromStr>(
    request_id: &str,
    field: &str,
    raw: Option<&str>,
) -> Result<Vec<T>, ApiError> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|_| {
                ApiError::new(
                    request_id,
                    "validation_error",
                    format!("unknown {field} '{s}'"),
                )
            })
        })
        .collect()
}

fn to_filter(request_id: &str, query: KolListQuery) -> Result<KolFilter, ApiError> {
    Ok(KolFilter {
        statuses: parse_list::<KolStatus>(request_id, "status", query.status.as_deref())?,
        platforms: parse_list::<Platform>(request_id, "platform", query.platform.as_deref())?,
        search: query.search,
    })
}

/// GET /api/v1/kols: roster in display order (newest first).
pub(super) async fn list_kols(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<KolListQuery>,
) -> Result<Json<ApiResponse<Vec<Kol>>>, ApiError> {
    let rid = &req_id.0;
    let filter = to_filter(rid, query)?;
    let kols = state
        .service
        .list_kols(&filter)
        .await
        .iter()
        .map(|k| Kol::clone(k))
        .collect();
    Ok(ApiResponse::new(rid, kols))
}

/// POST /api/v1/kols
pub(super) async fn create_kol(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateKol>,
) -> Result<(StatusCode, Json<ApiResponse<Kol>>), ApiError> {
    let rid = &req_id.0;
    validate::name(rid, &body.name)?;
    validate::email(rid, body.email.as_deref())?;
    validate::platform_links(rid, &body.platforms)?;

    let kol = state
        .service
        .create_kol(&body)
        .await
        .map_err(|e| map_service_error(rid, e))?;
    Ok((StatusCode::CREATED, ApiResponse::new(rid, Kol::clone(&kol))))
}

/// GET /api/v1/kols/{kol_id}
pub(super) async fn get_kol(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(kol_id): Path<String>,
) -> Result<Json<ApiResponse<Kol>>, ApiError> {
    let rid = &req_id.0;
    let id = parse_id(rid, &kol_id)?;
    let kol = state
        .service
        .kol(id)
        .await
        .ok_or_else(|| ApiError::new(rid, "not_found", format!("kol {id} not found")))?;
    Ok(ApiResponse::new(rid, Kol::clone(&kol)))
}

/// PATCH /api/v1/kols/{kol_id}: absent fields are kept, `null` clears.
pub(super) async fn update_kol(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(kol_id): Path<String>,
    Json(body): Json<UpdateKol>,
) -> Result<Json<ApiResponse<Kol>>, ApiError> {
    let rid = &req_id.0;
    let id = parse_id(rid, &kol_id)?;
    if let Some(ref name) = body.name {
        validate::name(rid, name)?;
    }
    if let Some(Some(ref email)) = body.email {
        validate::email(rid, Some(email))?;
    }
    if let Some(ref links) = body.platforms {
        validate::platform_links(rid, links)?;
    }

    let kol = state
        .service
        .update_kol(id, &body)
        .await
        .map_err(|e| map_service_error(rid, e))?;
    Ok(ApiResponse::new(rid, Kol::clone(&kol)))
}

/// DELETE /api/v1/kols/{kol_id}
pub(super) async fn delete_kol(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(kol_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let id = parse_id(rid, &kol_id)?;
    state
        .service
        .delete_kol(id)
        .await
        .map_err(|e| map_service_error(rid, e))?;
    Ok(ApiResponse::new(rid, serde_json::json!({ "deleted": true })))
}

/// PUT /api/v1/kols/{kol_id}/platforms: the old set is dropped, not merged.
pub(super) async fn replace_platforms(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(kol_id): Path<String>,
    Json(body): Json<ReplacePlatformsRequest>,
) -> Result<Json<ApiResponse<Vec<PlatformLink>>>, ApiError> {
    let rid = &req_id.0;
    let id = parse_id(rid, &kol_id)?;
    validate::platform_links(rid, &body.platforms)?;

    let links = state
        .service
        .replace_platforms(id, &body.platforms)
        .await
        .map_err(|e| map_service_error(rid, e))?;
    Ok(ApiResponse::new(rid, links))
}

/// GET /api/v1/kols/{kol_id}/performance
pub(super) async fn weekly_performance(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(kol_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<WeeklyPerformance>>>, ApiError> {
    let rid = &req_id.0;
    let id = parse_id(rid, &kol_id)?;
    let weeks = state
        .service
        .weekly_performance(id)
        .await
        .map_err(|e| map_service_error(rid, e))?;
    Ok(ApiResponse::new(rid, weeks))
}
