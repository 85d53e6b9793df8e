use tracing::{info, warn};

use crate::auth::{hash_password_blocking, verify_password_blocking};
use crate::dtos::{LoginOutcome, RegisterStaffRequest};
use crate::{AppError, AppState};
use backend_domain::{normalize_email, EventStaff, NewEventStaff, StaffView};

pub async fn register_staff(
    state: &AppState,
    payload: RegisterStaffRequest,
) -> Result<StaffView, AppError> {
    let email = normalize_required_email(&payload.email)?;
    let password = normalize_required_password(payload.password)?;
    let event_name = normalize_optional_text(payload.event_name)
        .unwrap_or_else(|| state.config.default_event_name.clone());
    let specified_columns = normalize_optional_text(payload.specified_columns)
        .unwrap_or_else(|| state.config.default_columns.clone());

    let hashed_password =
        hash_password_blocking(password, state.config.password_hash_rounds).await?;
    let staff = state
        .staff_repo
        .insert_staff(&NewEventStaff {
            email,
            hashed_password,
            event_name,
            specified_columns,
        })
        .await?;
    info!(email = %staff.email, event_name = %staff.event_name, "staff registered");
    Ok(staff.view())
}

/// Unknown email and wrong password both end in `Unauthorized`.
pub async fn authenticate(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<EventStaff, AppError> {
    let email = normalize_email(email);
    let staff = state.staff_repo.find_by_email(&email).await?;
    let verified =
        verify_candidate(staff.as_ref(), password, state.config.password_hash_rounds).await?;
    state.metrics.record_login(verified);
    match staff {
        Some(staff) if verified => Ok(staff),
        _ => {
            warn!("rejected login attempt");
            Err(AppError::Unauthorized)
        }
    }
}

pub async fn login(state: &AppState, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
    let staff = authenticate(state, email, password).await?;
    let token = state.tokens.issue(&staff.email)?;
    info!(email = %staff.email, "staff logged in");
    Ok(LoginOutcome {
        staff: staff.view(),
        token,
    })
}

pub async fn update_password(
    state: &AppState,
    email: &str,
    new_password: String,
) -> Result<(), AppError> {
    let password = normalize_required_password(new_password)?;
    let hashed_password =
        hash_password_blocking(password, state.config.password_hash_rounds).await?;
    state
        .staff_repo
        .update_password(&normalize_email(email), &hashed_password)
        .await?;
    info!(email = %email, "staff password updated");
    Ok(())
}

pub async fn delete_staff(state: &AppState, email: &str) -> Result<(), AppError> {
    state.staff_repo.delete_staff(&normalize_email(email)).await?;
    info!(email = %email, "staff deleted");
    Ok(())
}

/// Spends one PBKDF2 derivation whether or not the account exists, so a
/// missing email costs as much as a wrong password.
async fn verify_candidate(
    staff: Option<&EventStaff>,
    password: &str,
    rounds: u32,
) -> Result<bool, AppError> {
    match staff {
        Some(staff) => {
            verify_password_blocking(password.to_string(), staff.hashed_password.clone()).await
        }
        None => {
            hash_password_blocking(password.to_string(), rounds).await?;
            Ok(false)
        }
    }
}

fn normalize_required_email(raw: &str) -> Result<String, AppError> {
    let email = normalize_email(raw);
    if email.is_empty() {
        return Err(AppError::InvalidArgument("email must not be empty".to_string()));
    }
    if !email.contains('@') {
        return Err(AppError::InvalidArgument(format!("invalid email '{}'", email)));
    }
    Ok(email)
}

fn normalize_required_password(raw: String) -> Result<String, AppError> {
    if raw.is_empty() {
        return Err(AppError::InvalidArgument(
            "password must not be empty".to_string(),
        ));
    }
    Ok(raw)
}

fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
