use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use koltrack_core::{ContentPost, NewPost, PostPatch};

use crate::middleware::RequestId;

use super::{map_service_error, parse_id, validate, ApiError, ApiResponse, AppState};

/// POST /api/v1/kols/{kol_id}/posts
pub(super) async fn create_post(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(kol_id): Path<String>,
    Json(body): Json<NewPost>,
) -> Result<(StatusCode, Json<ApiResponse<ContentPost>>), ApiError> {
    let rid = &req_id.0;
    let kol_id = parse_id(rid, &kol_id)?;
    validate::post(rid, &body)?;

    let post = state
        .service
        .add_post(kol_id, &body)
        .await
        .map_err(|e| map_service_error(rid, e))?;
    Ok((StatusCode::CREATED, ApiResponse::new(rid, post)))
}

/// PATCH /api/v1/kols/{kol_id}/posts/{post_id}
pub(super) async fn update_post(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((kol_id, post_id)): Path<(String, String)>,
    Json(body): Json<PostPatch>,
) -> Result<Json<ApiResponse<ContentPost>>, ApiError> {
    let rid = &req_id.0;
    let kol_id = parse_id(rid, &kol_id)?;
    let post_id = parse_id(rid, &post_id)?;
    if let Some(ref url) = body.url {
        validate::url(rid, "url", url)?;
    }
    validate::cost(rid, body.cost.flatten())?;

    let post = state
        .service
        .update_post(kol_id, post_id, &body)
        .await
        .map_err(|e| map_service_error(rid, e))?;
    Ok(ApiResponse::new(rid, post))
}

/// DELETE /api/v1/kols/{kol_id}/posts/{post_id}
pub(super) async fn delete_post(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((kol_id, post_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let kol_id = parse_id(rid, &kol_id)?;
    let post_id = parse_id(rid, &post_id)?;

    state
        .service
        .delete_post(kol_id, post_id)
        .await
        .map_err(|e| map_service_error(rid, e))?;
    Ok(ApiResponse::new(rid, serde_json::json!({ "deleted": true })))
}
