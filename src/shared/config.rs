use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub vehicle_id: String,
    /// Build-time staff id override; normally resolved at runtime.
    pub staff_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    pub sync_interval: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_attempt: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "https://farm-connect.amritagrotech.com/api".to_string(),
                vehicle_id: "TRC-2024-01".to_string(),
                staff_id: String::new(),
            },
            database: DatabaseConfig {
                url: default_database_url(),
                max_connections: 5,
                connection_timeout: 30,
            },
            sync: SyncConfig {
                auto_sync: true,
                sync_interval: 300, // 5 minutes
            },
            stream: StreamConfig {
                base_delay_ms: 500,
                max_delay_ms: 15_000,
                max_attempt: 10,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(base_url) = std::env::var("FARMLINK_BASE_URL") {
            if !base_url.trim().is_empty() {
                cfg.api.base_url = base_url.trim().to_string();
            }
        }
        if let Ok(vehicle_id) = std::env::var("FARMLINK_VEHICLE_ID") {
            if !vehicle_id.trim().is_empty() {
                cfg.api.vehicle_id = vehicle_id.trim().to_string();
            }
        }
        if let Ok(staff_id) = std::env::var("FARMLINK_STAFF_ID") {
            cfg.api.staff_id = staff_id.trim().to_string();
        }
        if let Ok(db_url) = std::env::var("FARMLINK_DATABASE_URL") {
            if !db_url.trim().is_empty() {
                cfg.database.url = db_url.trim().to_string();
            }
        }

        cfg
    }
}

fn default_database_url() -> String {
    let dir = dirs::data_local_dir()
        .map(|d| d.join("farmlink"))
        .unwrap_or_else(|| PathBuf::from("./data"));
    format!("sqlite://{}/farmlink.db?mode=rwc", dir.display())
}
