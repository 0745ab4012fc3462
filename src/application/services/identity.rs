use crate::application::ports::store::{keys, KeyValueStore};
use crate::domain::value_objects::StaffId;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Resolves the acting staff identity.
///
/// Precedence: active session value, then the configured override, then
/// whatever a prior session persisted. An empty result means
/// "unauthenticated" and callers skip network and stream work entirely.
/// Storage failures are never fatal here; a failed read counts as
/// "not found" and a failed write never blocks the in-memory state.
pub struct IdentityService {
    session: RwLock<Option<StaffId>>,
    configured: Option<StaffId>,
    kv: Arc<dyn KeyValueStore>,
}

impl IdentityService {
    pub fn new(configured: Option<StaffId>, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            session: RwLock::new(None),
            configured: configured.filter(|id| !id.is_empty()),
            kv,
        }
    }

    pub async fn set_session(&self, staff_id: Option<StaffId>) {
        *self.session.write().await = staff_id.filter(|id| !id.is_empty());
    }

    pub async fn resolve(&self) -> StaffId {
        if let Some(session) = self.session.read().await.clone() {
            return session;
        }
        if let Some(configured) = &self.configured {
            return configured.clone();
        }
        match self.kv.get(keys::STAFF_ID).await {
            Ok(Some(stored)) => {
                let stored = StaffId::new(stored);
                if !stored.is_empty() {
                    return stored;
                }
            }
            Ok(None) => {}
            Err(err) => {
                debug!("staff id read failed, treating as absent: {err}");
            }
        }
        StaffId::empty()
    }

    /// Persists the identity for the next session.
    pub async fn remember(&self, staff_id: &StaffId) {
        if staff_id.is_empty() {
            return;
        }
        if let Err(err) = self.kv.set(keys::STAFF_ID, staff_id.as_str()).await {
            warn!("failed to persist staff id: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::AppError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MemoryKv {
        values: Mutex<HashMap<String, String>>,
        fail_reads: bool,
    }

    impl MemoryKv {
        fn new() -> Self {
            Self { values: Mutex::new(HashMap::new()), fail_reads: false }
        }

        fn failing() -> Self {
            Self { values: Mutex::new(HashMap::new()), fail_reads: true }
        }

        fn with(key: &str, value: &str) -> Self {
            let kv = Self::new();
            kv.values.lock().unwrap().insert(key.to_string(), value.to_string());
            kv
        }
    }

    #[async_trait]
    impl KeyValueStore for MemoryKv {
        async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
            if self.fail_reads {
                return Err(AppError::Storage("kv unavailable".to_string()));
            }
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
            self.values.lock().unwrap().insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<(), AppError> {
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[tokio::test]
    async fn session_wins_over_configured_and_persisted() {
        let kv = Arc::new(MemoryKv::with(keys::STAFF_ID, "S-stored"));
        let service = IdentityService::new(Some(StaffId::new("S-config")), kv);
        service.set_session(Some(StaffId::new("S-session"))).await;

        assert_eq!(service.resolve().await.as_str(), "S-session");
    }

    #[tokio::test]
    async fn configured_wins_over_persisted() {
        let kv = Arc::new(MemoryKv::with(keys::STAFF_ID, "S-stored"));
        let service = IdentityService::new(Some(StaffId::new("S-config")), kv);

        assert_eq!(service.resolve().await.as_str(), "S-config");
    }

    #[tokio::test]
    async fn falls_back_to_persisted_value() {
        let kv = Arc::new(MemoryKv::with(keys::STAFF_ID, " S-stored "));
        let service = IdentityService::new(None, kv);

        assert_eq!(service.resolve().await.as_str(), "S-stored");
    }

    #[tokio::test]
    async fn storage_failure_reads_as_unauthenticated() {
        let kv = Arc::new(MemoryKv::failing());
        let service = IdentityService::new(None, kv);

        assert!(service.resolve().await.is_empty());
    }

    #[tokio::test]
    async fn remember_persists_for_the_next_session() {
        let kv = Arc::new(MemoryKv::new());
        let service = IdentityService::new(None, kv.clone());
        service.remember(&StaffId::new("S1")).await;

        let fresh = IdentityService::new(None, kv);
        assert_eq!(fresh.resolve().await.as_str(), "S1");
    }

    #[tokio::test]
    async fn clearing_the_session_falls_back() {
        let kv = Arc::new(MemoryKv::new());
        let service = IdentityService::new(None, kv);
        service.set_session(Some(StaffId::new("S1"))).await;
        service.set_session(None).await;

        assert!(service.resolve().await.is_empty());
    }
}
