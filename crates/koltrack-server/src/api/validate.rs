//! Request checks applied before anything reaches the roster service.
//!
//! Email and URL shape come from `koltrack-core`, the same checks the service
//! runs for imports; failing early here keeps the request id on the error.

use koltrack_core::{validate_email, validate_http_url, CoreError, NewPlatformLink, NewPost};

use super::ApiError;

const MAX_NAME_CHARS: usize = 200;

fn invalid(request_id: &str, message: impl Into<String>) -> ApiError {
    ApiError::new(request_id, "validation_error", message)
}

fn from_core(request_id: &str, error: CoreError) -> ApiError {
    match error {
        CoreError::Validation(message) => invalid(request_id, message),
        other => invalid(request_id, other.to_string()),
    }
}

pub(super) fn name(request_id: &str, value: &str) -> Result<(), ApiError> {
    let count = value.trim().chars().count();
    if count == 0 || count > MAX_NAME_CHARS {
        return Err(invalid(request_id, "name must be 1-200 characters"));
    }
    Ok(())
}

pub(super) fn email(request_id: &str, value: Option<&str>) -> Result<(), ApiError> {
    match value {
        Some(v) => validate_email(v).map_err(|e| from_core(request_id, e)),
        None => Ok(()),
    }
}

pub(super) fn url(request_id: &str, field: &str, value: &str) -> Result<(), ApiError> {
    validate_http_url(field, value).map_err(|e| from_core(request_id, e))
}

pub(super) fn platform_links(request_id: &str, links: &[NewPlatformLink]) -> Result<(), ApiError> {
    for link in links {
        url(request_id, "profile_url", &link.profile_url)?;
        if link.follower_count < 0 {
            return Err(invalid(request_id, "follower_count must be non-negative"));
        }
    }
    Ok(())
}

pub(super) fn post(request_id: &str, post: &NewPost) -> Result<(), ApiError> {
    url(request_id, "url", &post.url)?;
    if post.impressions < 0 {
        return Err(invalid(request_id, "impressions must be non-negative"));
    }
    cost(request_id, post.cost)
}

pub(super) fn cost(request_id: &str, value: Option<f64>) -> Result<(), ApiError> {
    match value {
        Some(c) if !c.is_finite() || c < 0.0 => {
            Err(invalid(request_id, "cost must be a non-negative number"))
        }
        _ => Ok(()),
    }
}
