use tracing::warn;

use crate::{AppError, AppState};
use backend_domain::{EventStaff, Record};

/// Resolves a bearer token to a staff member that still exists.
pub async fn current_staff(state: &AppState, token: &str) -> Result<EventStaff, AppError> {
    let email = state.tokens.validate(token).map_err(|err| {
        warn!("rejected bearer token: {}", err);
        AppError::from(err)
    })?;
    state
        .staff_repo
        .find_by_email(&email)
        .await?
        .ok_or(AppError::Unauthorized)
}

/// Records of the staff member's event, showing only their specified columns.
pub async fn staff_records(state: &AppState, staff: &EventStaff) -> Result<Vec<Record>, AppError> {
    let columns = staff.columns();
    let records = state.record_repo.list_by_event(&staff.event_name).await?;
    Ok(records
        .iter()
        .map(|record| record.projected(&columns))
        .collect())
}
