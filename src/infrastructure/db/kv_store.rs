use crate::application::ports::store::KeyValueStore;
use crate::infrastructure::db::connection::DbPool;
use crate::infrastructure::db::queries;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;

/// sqlite-backed string key/value store.
pub struct SqliteKeyValueStore {
    pool: DbPool,
}

impl SqliteKeyValueStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let value = sqlx::query_scalar::<_, String>(queries::SELECT_KV)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(queries::UPSERT_KV)
            .bind(key)
            .bind(value)
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        sqlx::query(queries::DELETE_KV)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> DbPool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn set_get_remove_roundtrip() {
        let store = SqliteKeyValueStore::new(setup_test_db().await);

        assert_eq!(store.get("STAFF_ID").await.unwrap(), None);

        store.set("STAFF_ID", "S1").await.unwrap();
        assert_eq!(store.get("STAFF_ID").await.unwrap(), Some("S1".to_string()));

        store.set("STAFF_ID", "S2").await.unwrap();
        assert_eq!(store.get("STAFF_ID").await.unwrap(), Some("S2".to_string()));

        store.remove("STAFF_ID").await.unwrap();
        assert_eq!(store.get("STAFF_ID").await.unwrap(), None);
    }

    #[tokio::test]
    async fn removing_a_missing_key_is_fine() {
        let store = SqliteKeyValueStore::new(setup_test_db().await);
        store.remove("CHECKIN_REQUEST_ID").await.unwrap();
    }
}
