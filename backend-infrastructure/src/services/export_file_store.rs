use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use backend_domain::{ExportColumn, ExportStore, StoreError};

/// Export file at a fixed path. Writers are serialized and each write
/// replaces the previous export in one rename.
pub struct CsvExportStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvExportStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "export.csv".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

pub fn render_csv(column: ExportColumn, values: &[String]) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([column.as_str()])
        .map_err(StoreError::storage)?;
    for value in values {
        writer.write_record([value]).map_err(StoreError::storage)?;
    }
    writer
        .into_inner()
        .map_err(|err| StoreError::storage(err.error()))
}

#[async_trait]
impl ExportStore for CsvExportStore {
    async fn write_column(
        &self,
        column: ExportColumn,
        values: &[String],
    ) -> Result<String, StoreError> {
        let content = render_csv(column, values)?;
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StoreError::storage)?;
        }
        let staging = self.staging_path();
        tokio::fs::write(&staging, &content)
            .await
            .map_err(StoreError::storage)?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(StoreError::storage)?;

        info!(
            "export written: column={} rows={} path={}",
            column.as_str(),
            values.len(),
            self.path.display()
        );
        Ok(self.path.to_string_lossy().to_string())
    }

    async fn read_latest(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::storage(err)),
        }
    }
}
