use async_trait::async_trait;

use crate::entities::{EventStaff, NewEventStaff, NewRecord, Record, RecordPatch};
use crate::errors::StoreError;
use crate::value_objects::{ExportColumn, RecordFlag};

#[async_trait]
pub trait RecordRepository: Send + Sync {
    async fn ensure_schema(&self) -> Result<(), StoreError>;
    async fn insert_record(&self, record: &NewRecord) -> Result<Record, StoreError>;
    async fn fetch_by_id(&self, id: i64) -> Result<Option<Record>, StoreError>;
    async fn fetch_by_code(&self, code: &str) -> Result<Option<Record>, StoreError>;
    async fn list_by_event(&self, event_name: &str) -> Result<Vec<Record>, StoreError>;
    async fn list_all(&self) -> Result<Vec<Record>, StoreError>;
    async fn update_record(&self, code: &str, patch: &RecordPatch) -> Result<Record, StoreError>;
    async fn set_flag(
        &self,
        code: &str,
        flag: RecordFlag,
        value: bool,
    ) -> Result<Record, StoreError>;
    async fn delete_record(&self, code: &str) -> Result<(), StoreError>;
    /// Sets every record's code from `(event_name, id)`. Returns how many changed.
    async fn assign_codes(&self) -> Result<u64, StoreError>;
    async fn project_column(&self, column: ExportColumn) -> Result<Vec<String>, StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait StaffRepository: Send + Sync {
    async fn ensure_schema(&self) -> Result<(), StoreError>;
    async fn insert_staff(&self, staff: &NewEventStaff) -> Result<EventStaff, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<EventStaff>, StoreError>;
    async fn update_password(&self, email: &str, hashed_password: &str)
        -> Result<(), StoreError>;
    async fn delete_staff(&self, email: &str) -> Result<(), StoreError>;
}
