pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use crate::domain::entities::{
    OutgoingEntry, OutgoingPayload, Request, RequestCollection, RequestDraft, RequestPatch,
    StatusCounts,
};
pub use crate::domain::value_objects::{RequestId, RequestKind, RequestStatus, StaffId};
pub use crate::shared::config::AppConfig;
pub use crate::shared::error::AppError;
pub use crate::state::SyncEngine;

pub use crate::application::services::{FlushOutcome, StreamState, SyncEvent};

/// Initializes tracing for hosts that have no subscriber of their own.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farmlink_sync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
