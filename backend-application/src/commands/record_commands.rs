use tracing::{error, info};

use crate::{AppError, AppState};
use backend_domain::{NewRecord, Record, RecordFlag, RecordPatch};

pub async fn create_record(state: &AppState, new_record: NewRecord) -> Result<Record, AppError> {
    let new_record = new_record.normalized()?;
    let record = state
        .record_repo
        .insert_record(&new_record)
        .await
        .map_err(|err| {
            error!("failed to insert record: {}", err);
            AppError::from(err)
        })?;
    state.metrics.record_created();
    info!(id = record.id, event_name = %record.event_name, "record created");
    Ok(record)
}

/// Partial update by code. An empty patch returns the record unchanged.
pub async fn update_record(
    state: &AppState,
    code: &str,
    patch: RecordPatch,
) -> Result<Record, AppError> {
    let patch = patch.normalized()?;
    if patch.is_empty() {
        return state
            .record_repo
            .fetch_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("record '{}'", code)));
    }
    let record = state.record_repo.update_record(code, &patch).await?;
    Ok(record)
}

/// Flag names outside the allowed set are rejected before the store is touched.
pub async fn update_flag(
    state: &AppState,
    code: &str,
    flag: &str,
    value: bool,
) -> Result<Record, AppError> {
    let flag = flag.parse::<RecordFlag>()?;
    let record = state.record_repo.set_flag(code, flag, value).await?;
    info!(code = %code, flag = %flag, value, "record flag updated");
    Ok(record)
}

pub async fn delete_record(state: &AppState, code: &str) -> Result<(), AppError> {
    state.record_repo.delete_record(code).await?;
    info!(code = %code, "record deleted");
    Ok(())
}

pub async fn assign_codes(state: &AppState) -> Result<u64, AppError> {
    let updated = state.record_repo.assign_codes().await.map_err(|err| {
        error!("failed to assign record codes: {}", err);
        AppError::from(err)
    })?;
    info!(updated, "record codes assigned");
    Ok(updated)
}
