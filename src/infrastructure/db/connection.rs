use crate::shared::config::DatabaseConfig;
use crate::shared::error::AppError;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub type DbPool = Pool<Sqlite>;

pub struct Database;

impl Database {
    pub async fn initialize(config: &DatabaseConfig) -> Result<DbPool, AppError> {
        if let Some(path) = database_path(&config.url) {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|err| AppError::Storage(err.to_string()))?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;

        info!("Database connected: {}", config.url);

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }
}

/// File path behind a `sqlite:` URL; `None` for in-memory databases.
fn database_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("sqlite:")?;
    let rest = rest.trim_start_matches("//");
    let rest = rest.split('?').next().unwrap_or(rest);
    if rest.is_empty() || rest == ":memory:" {
        None
    } else {
        Some(PathBuf::from(rest))
    }
}
