use serde_json::{Map, Value};

use crate::{AppError, AppState};
use backend_domain::Record;

pub async fn get_record_by_id(state: &AppState, id: i64) -> Result<Record, AppError> {
    state
        .record_repo
        .fetch_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("record #{}", id)))
}

pub async fn get_record_by_code(state: &AppState, code: &str) -> Result<Record, AppError> {
    state
        .record_repo
        .fetch_by_code(code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("record '{}'", code)))
}

/// Record fields and parameters merged into one object.
pub async fn get_flattened_record(
    state: &AppState,
    code: &str,
) -> Result<Map<String, Value>, AppError> {
    let record = get_record_by_code(state, code).await?;
    Ok(record.flattened())
}

pub async fn list_records_by_event(
    state: &AppState,
    event_name: &str,
) -> Result<Vec<Record>, AppError> {
    let records = state.record_repo.list_by_event(event_name.trim()).await?;
    Ok(records)
}

pub async fn list_all_records(state: &AppState) -> Result<Vec<Record>, AppError> {
    let records = state.record_repo.list_all().await?;
    Ok(records)
}
