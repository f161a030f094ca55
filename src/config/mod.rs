//! Configuration module for the Sunny backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Where content lists are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// SQLite tables, reconciled on every save
    Sqlite,
    /// Full-list JSON snapshots on disk
    Local,
}

impl StorageMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "remote" => Some(StorageMode::Sqlite),
            "local" | "snapshot" => Some(StorageMode::Local),
            _ => None,
        }
    }
}

/// How a full-list save is applied to the SQLite tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Read, delete, then one upsert per record; partial failures are reported
    Sequential,
    /// The same steps inside a single transaction
    Transactional,
}

impl SyncMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Some(SyncMode::Sequential),
            "transactional" => Some(SyncMode::Transactional),
            _ => None,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Admin username
    pub admin_username: String,
    /// Admin password (admin login is disabled when unset)
    pub admin_password: Option<String>,
    /// Persistence backend
    pub storage: StorageMode,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Directory holding local JSON snapshots
    pub snapshot_dir: PathBuf,
    /// Reconciliation strategy for the SQLite backend
    pub sync_mode: SyncMode,
    /// Short-range forecast endpoint
    pub forecast_url: String,
    /// Historical archive endpoint
    pub archive_url: String,
    /// Timeout for weather provider requests
    pub weather_timeout_secs: u64,
    /// UTC offset used to decide what "today" is for dated weather queries
    pub weather_utc_offset_hours: i32,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let admin_username =
            env::var("SUNNY_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let admin_password = env::var("SUNNY_ADMIN_PASSWORD").ok();

        let storage = env::var("SUNNY_STORAGE")
            .ok()
            .and_then(|s| StorageMode::parse(&s))
            .unwrap_or(StorageMode::Sqlite);

        let db_path = env::var("SUNNY_DB_PATH")
            .unwrap_or_else(|_| "./data/sunny.sqlite".to_string())
            .into();

        let snapshot_dir = env::var("SUNNY_SNAPSHOT_DIR")
            .unwrap_or_else(|_| "./data/snapshots".to_string())
            .into();

        let sync_mode = env::var("SUNNY_SYNC_MODE")
            .ok()
            .and_then(|s| SyncMode::parse(&s))
            .unwrap_or(SyncMode::Sequential);

        let forecast_url = env::var("SUNNY_FORECAST_URL")
            .unwrap_or_else(|_| "https://api.open-meteo.com/v1/forecast".to_string());

        let archive_url = env::var("SUNNY_ARCHIVE_URL")
            .unwrap_or_else(|_| "https://archive-api.open-meteo.com/v1/archive".to_string());

        let weather_timeout_secs = env::var("SUNNY_WEATHER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let weather_utc_offset_hours = env::var("SUNNY_WEATHER_UTC_OFFSET_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|h: &i32| (-23..=23).contains(h))
            .unwrap_or(9);

        let bind_addr = env::var("SUNNY_BIND_ADDR")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)));

        let log_level = env::var("SUNNY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            admin_username,
            admin_password,
            storage,
            db_path,
            snapshot_dir,
            sync_mode,
            forecast_url,
            archive_url,
            weather_timeout_secs,
            weather_utc_offset_hours,
            bind_addr,
            log_level,
        }
    }
}
