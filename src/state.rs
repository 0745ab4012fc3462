use crate::application::ports::store::{keys, KeyValueStore, OutgoingStore};
use crate::application::ports::stream_connector::StreamConnector;
use crate::application::ports::task_api::TaskApiGateway;
use crate::application::services::{
    BackoffPolicy, EventStreamClient, FlushOutcome, IdentityService, QueueService, RequestStore,
    SnapshotService, StatusService, StreamChannel, SyncEvent,
};
use crate::domain::entities::{
    OutgoingEntry, Request, RequestCollection, RequestDraft, RequestPatch, StatusCounts,
};
use crate::domain::value_objects::{RequestId, RequestStatus, StaffId};
use crate::infrastructure::api::HttpTaskApi;
use crate::infrastructure::db::{Database, SqliteKeyValueStore, SqliteOutgoingStore};
use crate::infrastructure::stream::{build_stream_url, WsConnector};
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// The assembled reconciliation engine.
///
/// Owns the shared request collection and every service around it. The
/// hosting view layer keeps one `Arc<SyncEngine>`, renders from
/// `requests()`, and reacts to the receiver returned by `take_events()`.
pub struct SyncEngine {
    config: AppConfig,
    kv: Arc<dyn KeyValueStore>,
    identity: Arc<IdentityService>,
    store: Arc<RequestStore>,
    snapshot: SnapshotService,
    queue: QueueService,
    status: StatusService,
    logistics_stream: Arc<EventStreamClient>,
    fuel_stream: Arc<EventStreamClient>,
    events_rx: RwLock<Option<mpsc::UnboundedReceiver<SyncEvent>>>,
    refresher: Mutex<Option<JoinHandle<()>>>,
}

impl SyncEngine {
    pub async fn new(config: AppConfig) -> Result<Arc<Self>, AppError> {
        let pool = Database::initialize(&config.database).await?;
        let kv: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(pool.clone()));
        let outgoing: Arc<dyn OutgoingStore> = Arc::new(SqliteOutgoingStore::new(pool));
        let api: Arc<dyn TaskApiGateway> = Arc::new(HttpTaskApi::new(&config.api.base_url));
        let connector: Arc<dyn StreamConnector> = Arc::new(WsConnector);
        Ok(Self::with_gateways(config, api, connector, kv, outgoing))
    }

    /// Assembly seam: the same wiring with caller-provided ports.
    pub fn with_gateways(
        config: AppConfig,
        api: Arc<dyn TaskApiGateway>,
        connector: Arc<dyn StreamConnector>,
        kv: Arc<dyn KeyValueStore>,
        outgoing: Arc<dyn OutgoingStore>,
    ) -> Arc<Self> {
        let configured = if config.api.staff_id.trim().is_empty() {
            None
        } else {
            Some(StaffId::new(config.api.staff_id.clone()))
        };
        let identity = Arc::new(IdentityService::new(configured, kv.clone()));
        let store = Arc::new(RequestStore::new());
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let policy = BackoffPolicy::new(&config.stream);

        let stream = |channel: StreamChannel| {
            Arc::new(EventStreamClient::new(
                channel,
                build_stream_url(&config.api.base_url, channel.path()),
                connector.clone(),
                identity.clone(),
                store.clone(),
                events_tx.clone(),
                policy.clone(),
            ))
        };
        let logistics_stream = stream(StreamChannel::Logistics);
        let fuel_stream = stream(StreamChannel::FuelRequests);

        Arc::new(Self {
            snapshot: SnapshotService::new(api.clone()),
            queue: QueueService::new(api.clone(), outgoing, identity.clone()),
            status: StatusService::new(api),
            logistics_stream,
            fuel_stream,
            events_rx: RwLock::new(Some(events_rx)),
            refresher: Mutex::new(None),
            config,
            kv,
            identity,
            store,
        })
    }

    /// Connects both realtime channels and, when auto sync is on, starts
    /// the periodic snapshot refresh.
    pub async fn start(self: &Arc<Self>) {
        self.connect_streams().await;
        if self.config.sync.auto_sync {
            self.schedule_refresh().await;
        }
    }

    pub async fn login(&self, staff_id: &str) {
        let staff_id = StaffId::new(staff_id);
        self.identity.set_session(Some(staff_id.clone())).await;
        self.identity.remember(&staff_id).await;
    }

    pub async fn logout(&self) {
        self.identity.set_session(None).await;
    }

    pub async fn staff_id(&self) -> StaffId {
        self.identity.resolve().await
    }

    pub async fn requests(&self) -> RequestCollection {
        self.store.snapshot().await
    }

    pub async fn counts(&self) -> StatusCounts {
        self.store.counts().await
    }

    /// One snapshot pull merged into the collection. Unauthenticated
    /// sessions skip the network entirely. A fetch failure still leaves
    /// the collection usable and is surfaced here for reporting.
    pub async fn refresh(&self) -> Result<usize, AppError> {
        let staff_id = self.identity.resolve().await;
        if staff_id.is_empty() {
            return Ok(0);
        }
        let snapshot = self.snapshot.fetch_pending(&staff_id).await;
        let fetched = snapshot.requests.len();
        self.store.reconcile(snapshot.requests).await;
        match snapshot.error {
            Some(err) => Err(err),
            None => Ok(fetched),
        }
    }

    /// Merges the backend's view of previously submitted requests.
    pub async fn refresh_outgoing(&self) -> Result<usize, AppError> {
        let staff_id = self.identity.resolve().await;
        if staff_id.is_empty() {
            return Ok(0);
        }
        let snapshot = self.snapshot.fetch_outgoing(&staff_id).await;
        let fetched = snapshot.requests.len();
        self.store.reconcile(snapshot.requests).await;
        match snapshot.error {
            Some(err) => Err(err),
            None => Ok(fetched),
        }
    }

    pub async fn create_request(&self, draft: RequestDraft) -> Result<OutgoingEntry, AppError> {
        self.queue.create_request(draft).await
    }

    pub async fn pending_outgoing(&self) -> Result<Vec<OutgoingEntry>, AppError> {
        self.queue.peek_all().await
    }

    pub async fn flush_outgoing(&self) -> Result<FlushOutcome, AppError> {
        self.queue.flush().await
    }

    /// Marks a request delivered. The local transition happens only after
    /// the backend confirms; every failure leaves the collection as it was.
    pub async fn mark_delivered(&self, id: &RequestId) -> Result<Request, AppError> {
        let request = self
            .store
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("request {} is not in the collection", id)))?;
        self.status.mark_delivered(&request).await?;

        let patch = RequestPatch::new(id.clone()).with_status(RequestStatus::Done);
        self.store.apply(&patch).await;
        Ok(request.patched(&patch))
    }

    /// Commits a parked terminal update after the user confirmed it, then
    /// clears the cached check-in reference it settles.
    pub async fn acknowledge(&self, id: &RequestId) -> Option<Request> {
        let updated = self.store.acknowledge(id).await?;
        self.clear_checkin_reference(&updated).await;
        Some(updated)
    }

    async fn clear_checkin_reference(&self, request: &Request) {
        let stored = match self.kv.get(keys::CHECKIN_REQUEST_ID).await {
            Ok(stored) => stored,
            Err(err) => {
                debug!("check-in reference read failed: {err}");
                None
            }
        };
        let stored = match stored {
            Some(stored) => stored,
            None => return,
        };
        let settled = request.server_request_id.as_deref() == Some(stored.as_str())
            || request.id.as_str() == stored;
        if settled {
            if let Err(err) = self.kv.remove(keys::CHECKIN_REQUEST_ID).await {
                warn!("failed to clear check-in reference: {err}");
            }
        }
    }

    pub async fn connect_streams(&self) {
        self.logistics_stream.connect().await;
        self.fuel_stream.connect().await;
    }

    async fn schedule_refresh(self: &Arc<Self>) {
        let mut refresher = self.refresher.lock().await;
        if let Some(handle) = refresher.as_ref() {
            if !handle.is_finished() {
                return;
            }
        }
        let engine = Arc::clone(self);
        let interval_secs = self.config.sync.sync_interval.max(1);
        *refresher = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            loop {
                interval.tick().await;
                if let Err(err) = engine.refresh().await {
                    warn!("scheduled refresh failed: {err}");
                }
            }
        }));
    }

    /// Tears down both stream clients and the periodic refresh. In-flight
    /// HTTP requests are allowed to finish and be discarded.
    pub async fn shutdown(&self) {
        self.logistics_stream.shutdown().await;
        self.fuel_stream.shutdown().await;
        if let Some(handle) = self.refresher.lock().await.take() {
            handle.abort();
        }
    }

    /// Hands the notification receiver to the hosting layer; there is
    /// exactly one.
    pub async fn take_events(&self) -> Option<mpsc::UnboundedReceiver<SyncEvent>> {
        self.events_rx.write().await.take()
    }

    /// Persisted theme preference; a failed read counts as unset.
    pub async fn theme(&self) -> Option<String> {
        match self.kv.get(keys::THEME).await {
            Ok(theme) => theme,
            Err(err) => {
                debug!("theme read failed, treating as unset: {err}");
                None
            }
        }
    }

    pub async fn set_theme(&self, theme: &str) {
        if let Err(err) = self.kv.set(keys::THEME, theme).await {
            warn!("failed to persist theme: {err}");
        }
    }
}
