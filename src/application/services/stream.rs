use crate::application::ports::stream_connector::StreamConnector;
use crate::application::services::identity::IdentityService;
use crate::application::services::mapping::{
    decode_fuel_event, decode_logistics_event, InboundEvent, StreamUpdate,
};
use crate::application::services::store::RequestStore;
use crate::domain::entities::RequestPatch;
use crate::domain::value_objects::{RequestId, RequestStatus};
use crate::shared::config::StreamConfig;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Notifications surfaced to the hosting view layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    RequestUpserted { id: RequestId },
    RequestUpdated { id: RequestId, status: RequestStatus },
    /// A terminal update arrived; the transition is parked until the user
    /// confirms it.
    ConfirmationRequired { id: RequestId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Connecting,
    Open,
    Backoff,
}

/// Reconnect schedule: `min(max_delay, base_delay * 2^attempt)`, attempt
/// capped so the delay plateaus instead of overflowing.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    base_delay_ms: u64,
    max_delay_ms: u64,
    max_attempt: u32,
}

impl BackoffPolicy {
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
            max_attempt: config.max_attempt,
        }
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        let exponential = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_millis(self.max_delay_ms.min(exponential))
    }

    pub fn next_attempt(&self, attempt: u32) -> u32 {
        (attempt + 1).min(self.max_attempt)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(&StreamConfig {
            base_delay_ms: 500,
            max_delay_ms: 15_000,
            max_attempt: 10,
        })
    }
}

/// The two backend push channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamChannel {
    Logistics,
    FuelRequests,
}

impl StreamChannel {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Logistics => "/ws/logistics",
            Self::FuelRequests => "/ws/fuel_requests",
        }
    }

    pub fn decode(&self, text: &str) -> Option<InboundEvent> {
        match self {
            Self::Logistics => decode_logistics_event(text),
            Self::FuelRequests => decode_fuel_event(text),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Logistics => "logistics",
            Self::FuelRequests => "fuel_requests",
        }
    }
}

/// Long-lived subscription to one push channel.
///
/// Self-heals on unexpected closes with bounded backoff and an unbounded
/// retry count, never connects twice at once, never reconnects without an
/// authenticated identity, and stops for good only on explicit shutdown.
pub struct EventStreamClient {
    channel: StreamChannel,
    url: String,
    connector: Arc<dyn StreamConnector>,
    identity: Arc<IdentityService>,
    store: Arc<RequestStore>,
    events: mpsc::UnboundedSender<SyncEvent>,
    policy: BackoffPolicy,
    state: Arc<RwLock<StreamState>>,
    shutdown_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl EventStreamClient {
    pub fn new(
        channel: StreamChannel,
        url: String,
        connector: Arc<dyn StreamConnector>,
        identity: Arc<IdentityService>,
        store: Arc<RequestStore>,
        events: mpsc::UnboundedSender<SyncEvent>,
        policy: BackoffPolicy,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            channel,
            url,
            connector,
            identity,
            store,
            events,
            policy,
            state: Arc::new(RwLock::new(StreamState::Idle)),
            shutdown_tx,
            task: Mutex::new(None),
        }
    }

    pub async fn state(&self) -> StreamState {
        *self.state.read().await
    }

    /// Starts the pump task. A second call while one is live is a no-op.
    pub async fn connect(self: &Arc<Self>) {
        let mut task = self.task.lock().await;
        if let Some(handle) = task.as_ref() {
            if !handle.is_finished() {
                return;
            }
        }
        self.shutdown_tx.send_replace(false);
        let client = Arc::clone(self);
        *task = Some(tokio::spawn(async move { client.pump().await }));
    }

    /// Cancels any pending reconnect, closes the connection, and waits for
    /// the pump to finish. No reconnect is scheduled afterwards.
    pub async fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
        let handle = self.task.lock().await.take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                debug!("{} stream pump ended abnormally: {err}", self.channel.name());
            }
        }
        *self.state.write().await = StreamState::Idle;
    }

    async fn set_state(&self, state: StreamState) {
        *self.state.write().await = state;
    }

    async fn pump(self: Arc<Self>) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut attempt: u32 = 0;
        loop {
            if *shutdown_rx.borrow() {
                break;
            }
            if self.identity.resolve().await.is_empty() {
                debug!("{}: no staff identity, stream stays idle", self.channel.name());
                break;
            }

            self.set_state(StreamState::Connecting).await;
            match self.connector.connect(&self.url).await {
                Ok(mut connection) => {
                    info!("{} stream connected", self.channel.name());
                    self.set_state(StreamState::Open).await;
                    attempt = 0;
                    loop {
                        tokio::select! {
                            _ = shutdown_rx.changed() => {
                                connection.close().await;
                                self.set_state(StreamState::Idle).await;
                                return;
                            }
                            message = connection.next_text() => match message {
                                Some(Ok(text)) => self.handle_frame(&text).await,
                                Some(Err(err)) => {
                                    debug!("{} stream transport error: {err}", self.channel.name());
                                    break;
                                }
                                None => {
                                    debug!("{} stream closed by peer", self.channel.name());
                                    break;
                                }
                            }
                        }
                    }
                }
                Err(err) => {
                    warn!("{} stream connect failed: {err}", self.channel.name());
                }
            }

            if *shutdown_rx.borrow() {
                break;
            }
            if self.identity.resolve().await.is_empty() {
                break;
            }

            self.set_state(StreamState::Backoff).await;
            let delay = self.policy.delay(attempt);
            attempt = self.policy.next_attempt(attempt);
            tokio::select! {
                _ = shutdown_rx.changed() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        self.set_state(StreamState::Idle).await;
    }

    async fn handle_frame(&self, text: &str) {
        let event = match self.channel.decode(text) {
            Some(event) => event,
            None => return,
        };

        // Per-user fan-out filter; the only authorization the stream has.
        let current = self.identity.resolve().await;
        if !current.matches(&event.staff_id) {
            return;
        }

        match event.update {
            StreamUpdate::Created(request) => {
                let id = request.id.clone();
                self.store.upsert(request).await;
                self.emit(SyncEvent::RequestUpserted { id });
            }
            StreamUpdate::StatusChanged { id, status } if status.is_terminal() => {
                self.store
                    .park_terminal(RequestPatch::new(id.clone()).with_status(status))
                    .await;
                self.emit(SyncEvent::ConfirmationRequired { id });
            }
            StreamUpdate::StatusChanged { id, status } => {
                let patch = RequestPatch::new(id.clone()).with_status(status);
                if self.store.apply(&patch).await {
                    self.emit(SyncEvent::RequestUpdated { id, status });
                } else {
                    debug!("status update for unknown request {} dropped", id);
                }
            }
        }
    }

    fn emit(&self, event: SyncEvent) {
        if self.events.send(event).is_err() {
            debug!("no event subscriber; notification dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::store::KeyValueStore;
    use crate::application::ports::stream_connector::{StreamConnection, StreamError};
    use crate::domain::value_objects::StaffId;
    use crate::shared::error::AppError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex as StdMutex;

    struct NullKv;

    #[async_trait]
    impl KeyValueStore for NullKv {
        async fn get(&self, _key: &str) -> Result<Option<String>, AppError> {
            Ok(None)
        }
        async fn set(&self, _key: &str, _value: &str) -> Result<(), AppError> {
            Ok(())
        }
        async fn remove(&self, _key: &str) -> Result<(), AppError> {
            Ok(())
        }
    }

    struct ScriptedConnection {
        frames: VecDeque<String>,
        hold_open: bool,
    }

    #[async_trait]
    impl StreamConnection for ScriptedConnection {
        async fn next_text(&mut self) -> Option<Result<String, StreamError>> {
            match self.frames.pop_front() {
                Some(frame) => Some(Ok(frame)),
                None => {
                    if self.hold_open {
                        futures::future::pending::<()>().await;
                        unreachable!()
                    }
                    None
                }
            }
        }

        async fn close(&mut self) {}
    }

    /// Each connect() consumes the next script; the last script is held
    /// open until shutdown.
    struct ScriptedConnector {
        scripts: StdMutex<VecDeque<Vec<String>>>,
        connects: AtomicU32,
    }

    impl ScriptedConnector {
        fn new(scripts: Vec<Vec<String>>) -> Self {
            Self {
                scripts: StdMutex::new(scripts.into_iter().collect()),
                connects: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl StreamConnector for ScriptedConnector {
        async fn connect(&self, _url: &str) -> Result<Box<dyn StreamConnection>, StreamError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            let mut scripts = self.scripts.lock().unwrap();
            let hold_open = scripts.len() <= 1;
            let frames = scripts.pop_front().unwrap_or_default();
            Ok(Box::new(ScriptedConnection {
                frames: frames.into_iter().collect(),
                hold_open,
            }))
        }
    }

    fn created_frame(staff_id: &str, plan_id: &str) -> String {
        json!({
            "event": "LOGISTICS_REQUEST_CREATED",
            "data": {
                "staff_id": staff_id,
                "plan_id": plan_id,
                "date": "2026-01-27",
                "plan_entry": { "status": "pending", "request": "Drive belt" },
            },
        })
        .to_string()
    }

    struct Harness {
        client: Arc<EventStreamClient>,
        store: Arc<RequestStore>,
        events: mpsc::UnboundedReceiver<SyncEvent>,
        connector: Arc<ScriptedConnector>,
    }

    fn harness(staff: Option<&str>, scripts: Vec<Vec<String>>) -> Harness {
        let connector = Arc::new(ScriptedConnector::new(scripts));
        let identity = Arc::new(IdentityService::new(
            staff.map(StaffId::new),
            Arc::new(NullKv),
        ));
        let store = Arc::new(RequestStore::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let policy = BackoffPolicy::new(&StreamConfig {
            base_delay_ms: 1,
            max_delay_ms: 20,
            max_attempt: 10,
        });
        let client = Arc::new(EventStreamClient::new(
            StreamChannel::Logistics,
            "wss://example.test/ws/logistics".to_string(),
            connector.clone(),
            identity,
            store.clone(),
            tx,
            policy,
        ));
        Harness { client, store, events: rx, connector }
    }

    async fn recv(events: &mut mpsc::UnboundedReceiver<SyncEvent>) -> SyncEvent {
        tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("timed out waiting for a sync event")
            .expect("event channel closed")
    }

    #[test]
    fn backoff_doubles_until_the_ceiling() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_millis(500));
        assert_eq!(policy.delay(1), Duration::from_millis(1000));
        assert_eq!(policy.delay(2), Duration::from_millis(2000));
        assert_eq!(policy.delay(4), Duration::from_millis(8000));
        // 500 * 2^5 = 16s, past the ceiling.
        assert_eq!(policy.delay(5), Duration::from_millis(15_000));
        assert_eq!(policy.delay(10), Duration::from_millis(15_000));
    }

    #[test]
    fn attempt_counter_caps_at_the_configured_maximum() {
        let policy = BackoffPolicy::default();
        let mut attempt = 0;
        for _ in 0..20 {
            attempt = policy.next_attempt(attempt);
        }
        assert_eq!(attempt, 10);
    }

    #[tokio::test]
    async fn messages_for_other_users_change_nothing() {
        let mut h = harness(
            Some("S1"),
            vec![vec![created_frame("S2", "FOREIGN"), created_frame("S1", "MINE")]],
        );
        h.client.connect().await;

        let event = recv(&mut h.events).await;
        assert_eq!(event, SyncEvent::RequestUpserted { id: RequestId::new("MINE") });

        let collection = h.store.snapshot().await;
        assert!(collection.contains(&RequestId::new("MINE")));
        assert!(!collection.contains(&RequestId::new("FOREIGN")));

        h.client.shutdown().await;
    }

    #[tokio::test]
    async fn reconnects_after_an_unexpected_close() {
        let mut h = harness(
            Some("S1"),
            vec![
                vec![created_frame("S1", "FIRST")],  // closes after one frame
                vec![created_frame("S1", "SECOND")], // held open
            ],
        );
        h.client.connect().await;

        recv(&mut h.events).await;
        recv(&mut h.events).await;

        assert_eq!(h.connector.connects.load(Ordering::SeqCst), 2);
        let collection = h.store.snapshot().await;
        assert!(collection.contains(&RequestId::new("FIRST")));
        assert!(collection.contains(&RequestId::new("SECOND")));

        h.client.shutdown().await;
        assert_eq!(h.client.state().await, StreamState::Idle);
    }

    #[tokio::test]
    async fn connect_is_idempotent_while_live() {
        let h = harness(Some("S1"), vec![vec![]]);
        h.client.connect().await;
        h.client.connect().await;
        h.client.connect().await;

        // Give the single pump a chance to dial.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(h.connector.connects.load(Ordering::SeqCst), 1);

        h.client.shutdown().await;
    }

    #[tokio::test]
    async fn no_identity_means_no_connection() {
        let h = harness(None, vec![vec![]]);
        h.client.connect().await;
        h.client.shutdown().await;

        assert_eq!(h.connector.connects.load(Ordering::SeqCst), 0);
        assert_eq!(h.client.state().await, StreamState::Idle);
    }

    #[tokio::test]
    async fn shutdown_stops_reconnecting() {
        // First connection closes immediately, the second is held open.
        let h = harness(Some("S1"), vec![vec![], vec![]]);
        h.client.connect().await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        h.client.shutdown().await;

        let connects = h.connector.connects.load(Ordering::SeqCst);
        assert!(connects >= 1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(h.connector.connects.load(Ordering::SeqCst), connects);
    }
}
