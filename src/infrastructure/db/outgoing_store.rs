use crate::application::ports::store::OutgoingStore;
use crate::domain::entities::{OutgoingEntry, OutgoingPayload};
use crate::infrastructure::db::connection::DbPool;
use crate::infrastructure::db::queries;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::DateTime;
use sqlx::FromRow;

/// sqlite-backed outgoing request queue. The payload travels as a JSON
/// column; identity and confirmation state get their own columns.
pub struct SqliteOutgoingStore {
    pool: DbPool,
}

impl SqliteOutgoingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct OutgoingRow {
    local_id: String,
    payload: String,
    created_req_id: Option<String>,
    created_at: i64,
}

impl OutgoingRow {
    fn into_entry(self) -> Result<OutgoingEntry, AppError> {
        let payload: OutgoingPayload = serde_json::from_str(&self.payload)?;
        Ok(OutgoingEntry {
            local_id: self.local_id,
            payload,
            created_req_id: self.created_req_id,
            created_at: DateTime::from_timestamp(self.created_at, 0).unwrap_or_default(),
        })
    }
}

#[async_trait]
impl OutgoingStore for SqliteOutgoingStore {
    async fn append(&self, entry: &OutgoingEntry) -> Result<(), AppError> {
        let payload = serde_json::to_string(&entry.payload)
            .map_err(|err| AppError::SerializationError(err.to_string()))?;
        sqlx::query(queries::INSERT_OUTGOING)
            .bind(&entry.local_id)
            .bind(&payload)
            .bind(&entry.created_req_id)
            .bind(entry.created_at.timestamp())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<OutgoingEntry>, AppError> {
        let rows = sqlx::query_as::<_, OutgoingRow>(queries::SELECT_OUTGOING)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(OutgoingRow::into_entry).collect()
    }

    async fn confirm(&self, local_id: &str, created_req_id: &str) -> Result<(), AppError> {
        sqlx::query(queries::CONFIRM_OUTGOING)
            .bind(local_id)
            .bind(created_req_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove(&self, local_id: &str) -> Result<(), AppError> {
        sqlx::query(queries::DELETE_OUTGOING)
            .bind(local_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
