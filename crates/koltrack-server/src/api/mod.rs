mod documents;
mod import;
mod invoices;
mod kols;
mod metrics;
mod posts;
mod validate;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use koltrack_service::{RosterService, ServiceError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

const RETRY_MESSAGE: &str = "operation failed, please retry";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RosterService>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    data_source: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: &str, data: T) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id.to_owned()),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Translate a service failure. Storage errors are logged here, once, and the
/// caller only sees the generic retry message.
pub(super) fn map_service_error(request_id: &str, error: ServiceError) -> ApiError {
    match error {
        ServiceError::NotFound { .. } => ApiError::new(request_id, "not_found", error.to_string()),
        ServiceError::Validation(message) => {
            ApiError::new(request_id, "validation_error", message)
        }
        ServiceError::Db(e) => {
            tracing::error!(request_id, error = %e, "data source call failed");
            ApiError::new(request_id, "internal_error", RETRY_MESSAGE)
        }
    }
}

/// Path ids are parsed here so a malformed id gets the regular error envelope.
pub(super) fn parse_id(request_id: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::new(
            request_id,
            "validation_error",
            format!("'{raw}' is not a valid id"),
        )
    })
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/kols", get(kols::list_kols).post(kols::create_kol))
        .route(
            "/api/v1/kols/{kol_id}",
            get(kols::get_kol)
                .patch(kols::update_kol)
                .delete(kols::delete_kol),
        )
        .route(
            "/api/v1/kols/{kol_id}/platforms",
            put(kols::replace_platforms),
        )
        .route(
            "/api/v1/kols/{kol_id}/performance",
            get(kols::weekly_performance),
        )
        .route("/api/v1/kols/{kol_id}/posts", post(posts::create_post))
        .route(
            "/api/v1/kols/{kol_id}/posts/{post_id}",
            patch(posts::update_post).delete(posts::delete_post),
        )
        .route(
            "/api/v1/kols/{kol_id}/documents",
            post(documents::create_documents),
        )
        .route(
            "/api/v1/kols/{kol_id}/documents/{document_id}",
            patch(documents::update_document).delete(documents::delete_document),
        )
        .route("/api/v1/metrics/roster", get(metrics::roster_metrics))
        .route("/api/v1/metrics/cpm-by-kol", get(metrics::cpm_by_kol))
        .route(
            "/api/v1/invoices",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route(
            "/api/v1/invoices/{invoice_id}",
            patch(invoices::update_invoice).delete(invoices::delete_invoice),
        )
        .route("/api/v1/budget/summary", get(invoices::budget_summary))
        .route("/api/v1/import", post(import::import_kols))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let data_source = state.service.source().kind();

    match state.service.health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    data_source,
                    database: if data_source == "remote" {
                        "ok"
                    } else {
                        "not_configured"
                    },
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        data_source,
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}
