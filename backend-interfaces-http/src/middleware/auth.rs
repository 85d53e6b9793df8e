use axum::http::{header, HeaderMap};

use backend_application::queries::staff_queries;
use backend_application::AppState;
use backend_domain::EventStaff;

use crate::error::HttpError;

/// Resolves the bearer token to a live staff account.
pub async fn require_staff(state: &AppState, headers: &HeaderMap) -> Result<EventStaff, HttpError> {
    let token = extract_bearer(headers)
        .ok_or_else(|| HttpError::Unauthorized("missing bearer token".to_string()))?;
    Ok(staff_queries::current_staff(state, &token).await?)
}

pub fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let prefix = "Bearer ";
    if !value.starts_with(prefix) {
        return None;
    }
    let token = value[prefix.len()..].trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
