use crate::domain::entities::OutgoingEntry;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Well-known keys in the local key/value store.
pub mod keys {
    pub const STAFF_ID: &str = "STAFF_ID";
    pub const CHECKIN_REQUEST_ID: &str = "CHECKIN_REQUEST_ID";
    pub const THEME: &str = "theme";
}

/// Durable string key/value storage. Callers treat read failures as
/// "absent" and never let write failures block in-memory state.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    async fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// Durable storage for the outgoing request queue. Single-writer: the
/// engine owns the only handle, concurrent external writers are not
/// guarded against.
#[async_trait]
pub trait OutgoingStore: Send + Sync {
    async fn append(&self, entry: &OutgoingEntry) -> Result<(), AppError>;
    /// Oldest-first, unmodified.
    async fn list(&self) -> Result<Vec<OutgoingEntry>, AppError>;
    async fn confirm(&self, local_id: &str, created_req_id: &str) -> Result<(), AppError>;
    async fn remove(&self, local_id: &str) -> Result<(), AppError>;
}
