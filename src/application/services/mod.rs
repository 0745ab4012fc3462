pub mod identity;
pub mod mapping;
pub mod queue;
pub mod snapshot;
pub mod status;
pub mod store;
pub mod stream;

pub use identity::IdentityService;
pub use mapping::{InboundEvent, StreamUpdate};
pub use queue::{FlushOutcome, QueueService};
pub use snapshot::{Snapshot, SnapshotService};
pub use status::StatusService;
pub use store::RequestStore;
pub use stream::{BackoffPolicy, EventStreamClient, StreamChannel, StreamState, SyncEvent};
