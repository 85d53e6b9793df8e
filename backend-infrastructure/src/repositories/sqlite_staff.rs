use async_trait::async_trait;
use sqlx::SqlitePool;

use backend_domain::{EventStaff, NewEventStaff, StaffRepository, StoreError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS event_staff (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    hashed_password TEXT NOT NULL,
    event_name TEXT NOT NULL,
    specified_columns TEXT NOT NULL
)";

#[derive(Clone)]
pub struct SqliteStaffRepo {
    pool: SqlitePool,
}

impl SqliteStaffRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct StaffRow {
    id: i64,
    email: String,
    hashed_password: String,
    event_name: String,
    specified_columns: String,
}

impl From<StaffRow> for EventStaff {
    fn from(row: StaffRow) -> Self {
        EventStaff {
            id: row.id,
            email: row.email,
            hashed_password: row.hashed_password,
            event_name: row.event_name,
            specified_columns: row.specified_columns,
        }
    }
}

fn not_found(email: &str) -> StoreError {
    StoreError::NotFound(format!("staff '{}'", email))
}

#[async_trait]
impl StaffRepository for SqliteStaffRepo {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(StoreError::storage)?;
        Ok(())
    }

    async fn insert_staff(&self, staff: &NewEventStaff) -> Result<EventStaff, StoreError> {
        let row = sqlx::query_as::<_, StaffRow>(
            "INSERT INTO event_staff (email, hashed_password, event_name, specified_columns)
             VALUES (?, ?, ?, ?)
             RETURNING id, email, hashed_password, event_name, specified_columns",
        )
        .bind(&staff.email)
        .bind(&staff.hashed_password)
        .bind(&staff.event_name)
        .bind(&staff.specified_columns)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::DuplicateEmail(staff.email.clone())
            }
            other => StoreError::storage(other),
        })?;
        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<EventStaff>, StoreError> {
        let row = sqlx::query_as::<_, StaffRow>(
            "SELECT id, email, hashed_password, event_name, specified_columns
             FROM event_staff WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::storage)?;
        Ok(row.map(EventStaff::from))
    }

    async fn update_password(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE event_staff SET hashed_password = ? WHERE email = ?")
            .bind(hashed_password)
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(StoreError::storage)?;
        if result.rows_affected() == 0 {
            return Err(not_found(email));
        }
        Ok(())
    }

    async fn delete_staff(&self, email: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM event_staff WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(StoreError::storage)?;
        if result.rows_affected() == 0 {
            return Err(not_found(email));
        }
        Ok(())
    }
}
