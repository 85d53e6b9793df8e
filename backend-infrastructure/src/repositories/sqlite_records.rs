use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};

use backend_domain::{
    ExportColumn, NewRecord, Parameters, Record, RecordFlag, RecordPatch, RecordRepository,
    StoreError,
};

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        event_name TEXT NOT NULL,
        parameters TEXT NOT NULL DEFAULT '{}',
        code TEXT,
        signed_in BOOLEAN,
        signed_out BOOLEAN,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_records_event_name ON records (event_name)",
    "CREATE INDEX IF NOT EXISTS idx_records_code ON records (code)",
];

#[derive(Clone)]
pub struct SqliteRecordRepo {
    pool: SqlitePool,
}

impl SqliteRecordRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Read-then-write transaction holding the write lock from the start, so
    /// overlapping writers queue on the busy timeout instead of failing.
    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, StoreError> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(StoreError::storage)
    }
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: i64,
    event_name: String,
    parameters: String,
    code: Option<String>,
    signed_in: Option<bool>,
    signed_out: Option<bool>,
    created_at: DateTime<Utc>,
}

impl RecordRow {
    fn into_record(self) -> Result<Record, StoreError> {
        let parameters: Parameters = serde_json::from_str(&self.parameters).map_err(|err| {
            StoreError::Storage(format!(
                "record #{} has unreadable parameters: {}",
                self.id, err
            ))
        })?;
        Ok(Record {
            id: self.id,
            event_name: self.event_name,
            parameters,
            code: self.code,
            signed_in: self.signed_in,
            signed_out: self.signed_out,
            created_at: self.created_at,
        })
    }
}

fn into_records(rows: Vec<RecordRow>) -> Result<Vec<Record>, StoreError> {
    rows.into_iter().map(RecordRow::into_record).collect()
}

fn encode_parameters(parameters: &Parameters) -> Result<String, StoreError> {
    serde_json::to_string(parameters).map_err(StoreError::storage)
}

fn not_found(code: &str) -> StoreError {
    StoreError::NotFound(format!("record '{}'", code))
}

#[async_trait]
impl RecordRepository for SqliteRecordRepo {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(StoreError::storage)?;
        }
        Ok(())
    }

    async fn insert_record(&self, record: &NewRecord) -> Result<Record, StoreError> {
        let row = sqlx::query_as::<_, RecordRow>(
            "INSERT INTO records (event_name, parameters, created_at) VALUES (?, ?, ?)
             RETURNING id, event_name, parameters, code, signed_in, signed_out, created_at",
        )
        .bind(&record.event_name)
        .bind(encode_parameters(&record.parameters)?)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::storage)?;
        row.into_record()
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<Record>, StoreError> {
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT id, event_name, parameters, code, signed_in, signed_out, created_at
             FROM records WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::storage)?;
        row.map(RecordRow::into_record).transpose()
    }

    async fn fetch_by_code(&self, code: &str) -> Result<Option<Record>, StoreError> {
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT id, event_name, parameters, code, signed_in, signed_out, created_at
             FROM records WHERE code = ? ORDER BY id LIMIT 1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::storage)?;
        row.map(RecordRow::into_record).transpose()
    }

    async fn list_by_event(&self, event_name: &str) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query_as::<_, RecordRow>(
            "SELECT id, event_name, parameters, code, signed_in, signed_out, created_at
             FROM records WHERE event_name = ? ORDER BY id",
        )
        .bind(event_name)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::storage)?;
        into_records(rows)
    }

    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query_as::<_, RecordRow>(
            "SELECT id, event_name, parameters, code, signed_in, signed_out, created_at
             FROM records ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::storage)?;
        into_records(rows)
    }

    async fn update_record(&self, code: &str, patch: &RecordPatch) -> Result<Record, StoreError> {
        let mut tx = self.begin_write().await?;
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT id, event_name, parameters, code, signed_in, signed_out, created_at
             FROM records WHERE code = ? ORDER BY id LIMIT 1",
        )
        .bind(code)
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::storage)?;
        let mut record = row.ok_or_else(|| not_found(code))?.into_record()?;

        patch.apply_to(&mut record);
        sqlx::query(
            "UPDATE records
             SET event_name = ?, parameters = ?, code = ?, signed_in = ?, signed_out = ?
             WHERE id = ?",
        )
        .bind(&record.event_name)
        .bind(encode_parameters(&record.parameters)?)
        .bind(&record.code)
        .bind(record.signed_in)
        .bind(record.signed_out)
        .bind(record.id)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::storage)?;
        tx.commit().await.map_err(StoreError::storage)?;
        Ok(record)
    }

    async fn set_flag(
        &self,
        code: &str,
        flag: RecordFlag,
        value: bool,
    ) -> Result<Record, StoreError> {
        let statement = match flag {
            RecordFlag::SignedIn => {
                "UPDATE records SET signed_in = ? WHERE code = ?
                 RETURNING id, event_name, parameters, code, signed_in, signed_out, created_at"
            }
            RecordFlag::SignedOut => {
                "UPDATE records SET signed_out = ? WHERE code = ?
                 RETURNING id, event_name, parameters, code, signed_in, signed_out, created_at"
            }
        };
        let row = sqlx::query_as::<_, RecordRow>(statement)
            .bind(value)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::storage)?;
        row.ok_or_else(|| not_found(code))?.into_record()
    }

    async fn delete_record(&self, code: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM records WHERE code = ?")
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(StoreError::storage)?;
        if result.rows_affected() == 0 {
            return Err(not_found(code));
        }
        Ok(())
    }

    async fn assign_codes(&self) -> Result<u64, StoreError> {
        let mut tx = self.begin_write().await?;
        let rows = sqlx::query_as::<_, (i64, String, Option<String>)>(
            "SELECT id, event_name, code FROM records ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(StoreError::storage)?;

        let mut updated = 0;
        for (id, event_name, current) in rows {
            let code = backend_domain::RecordCode::derive(&event_name, id).into_inner();
            if current.as_deref() == Some(code.as_str()) {
                continue;
            }
            sqlx::query("UPDATE records SET code = ? WHERE id = ?")
                .bind(&code)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::storage)?;
            updated += 1;
        }
        tx.commit().await.map_err(StoreError::storage)?;
        Ok(updated)
    }

    async fn project_column(&self, column: ExportColumn) -> Result<Vec<String>, StoreError> {
        let records = self.list_all().await?;
        if records.is_empty() {
            return Err(StoreError::NotFound("records".to_string()));
        }
        Ok(records.iter().map(|record| column.render(record)).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StoreError::storage)?;
        Ok(())
    }
}
