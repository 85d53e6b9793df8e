use async_trait::async_trait;

use crate::errors::{DeliveryError, StoreError};
use crate::value_objects::ExportColumn;

#[async_trait]
pub trait MailRelay: Send + Sync {
    async fn relay_upload(&self, filename: &str, content: Vec<u8>) -> Result<(), DeliveryError>;
}

/// Single-slot export file: each write replaces the previous export.
#[async_trait]
pub trait ExportStore: Send + Sync {
    /// Writes the column and returns the location of the file.
    async fn write_column(
        &self,
        column: ExportColumn,
        values: &[String],
    ) -> Result<String, StoreError>;
    async fn read_latest(&self) -> Result<Option<Vec<u8>>, StoreError>;
}
