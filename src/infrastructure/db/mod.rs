mod connection;
mod kv_store;
mod outgoing_store;
mod queries;

pub use connection::{Database, DbPool};
pub use kv_store::SqliteKeyValueStore;
pub use outgoing_store::SqliteOutgoingStore;
