use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::Deserialize;

use backend_application::auth::IssuedToken;
use backend_application::commands::staff_commands;
use backend_application::dtos::{PasswordChangeRequest, RegisterStaffRequest};
use backend_application::queries::staff_queries;
use backend_application::AppState;
use backend_domain::{Record, StaffView};

use crate::error::HttpError;
use crate::middleware::require_staff;

/// OAuth2-style password form.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn register_staff(
    State(state): State<AppState>,
    Json(payload): Json<RegisterStaffRequest>,
) -> Result<Json<StaffView>, HttpError> {
    let staff = staff_commands::register_staff(&state, payload).await?;
    Ok(Json(staff))
}

/// Redirects to the staff member's event listing with the token in the query.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, HttpError> {
    let outcome = staff_commands::login(&state, &form.username, &form.password).await?;
    let location = format!(
        "{}/records/{}/?token={}",
        state.config.public_base_url.trim_end_matches('/'),
        encode_path_segment(&outcome.staff.event_name),
        outcome.token.access_token
    );
    let location = HeaderValue::from_str(&location)
        .map_err(|err| HttpError::Internal(format!("invalid redirect location: {}", err)))?;
    Ok((StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response())
}

pub async fn issue_token(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<IssuedToken>, HttpError> {
    let outcome = staff_commands::login(&state, &form.username, &form.password).await?;
    Ok(Json(outcome.token))
}

pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StaffView>, HttpError> {
    let staff = require_staff(&state, &headers).await?;
    Ok(Json(staff.view()))
}

pub async fn list_my_records(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Record>>, HttpError> {
    let staff = require_staff(&state, &headers).await?;
    let records = staff_queries::staff_records(&state, &staff).await?;
    Ok(Json(records))
}

pub async fn change_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PasswordChangeRequest>,
) -> Result<StatusCode, HttpError> {
    let staff = require_staff(&state, &headers).await?;
    staff_commands::update_password(&state, &staff.email, payload.new_password).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_account(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, HttpError> {
    let staff = require_staff(&state, &headers).await?;
    staff_commands::delete_staff(&state, &staff.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn encode_path_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segment_keeps_unreserved_characters() {
        assert_eq!(encode_path_segment("CONF-2024_a.b~"), "CONF-2024_a.b~");
    }

    #[test]
    fn path_segment_escapes_everything_else() {
        assert_eq!(encode_path_segment("Expo Hall/2"), "Expo%20Hall%2F2");
        assert_eq!(encode_path_segment("é"), "%C3%A9");
    }
}
