use tracing::{error, info};

use crate::dtos::UploadReceipt;
use crate::{AppError, AppState};

/// Forwards an uploaded file to the configured mail recipient.
pub async fn relay_upload(
    state: &AppState,
    filename: &str,
    content: Vec<u8>,
) -> Result<UploadReceipt, AppError> {
    let filename = filename.trim();
    if filename.is_empty() {
        return Err(AppError::InvalidArgument("filename must not be empty".to_string()));
    }
    if content.is_empty() {
        return Err(AppError::InvalidArgument(format!("file '{}' is empty", filename)));
    }

    let size = content.len();
    if let Err(err) = state.mail_relay.relay_upload(filename, content).await {
        state.metrics.record_upload(false);
        error!("failed to relay upload '{}': {}", filename, err);
        return Err(AppError::Delivery(err));
    }
    state.metrics.record_upload(true);
    info!(filename = %filename, bytes = size, "upload relayed");
    Ok(UploadReceipt {
        message: "file relayed".to_string(),
        filename: filename.to_string(),
    })
}
