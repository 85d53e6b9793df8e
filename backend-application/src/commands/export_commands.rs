use tracing::{error, info};

use crate::dtos::ExportSummary;
use crate::{AppError, AppState};
use backend_domain::ExportColumn;

/// Projects one allow-listed column of every record into the export file.
pub async fn export_column(state: &AppState, column: &str) -> Result<ExportSummary, AppError> {
    let column = column.parse::<ExportColumn>()?;
    let values = state.record_repo.project_column(column).await?;
    let path = state
        .export_store
        .write_column(column, &values)
        .await
        .map_err(|err| {
            error!("failed to write export file: {}", err);
            AppError::from(err)
        })?;
    state.metrics.record_export();
    info!(column = %column, rows = values.len(), path = %path, "column exported");
    Ok(ExportSummary {
        column: column.as_str().to_string(),
        rows: values.len(),
        path,
    })
}

pub async fn latest_export(state: &AppState) -> Result<Vec<u8>, AppError> {
    state
        .export_store
        .read_latest()
        .await?
        .ok_or_else(|| AppError::NotFound("export file".to_string()))
}
