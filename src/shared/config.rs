use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    pub image_root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            database: DatabaseConfig {
                url: format!("sqlite:{}?mode=rwc", data_dir.join("documents.db").display()),
                max_connections: 5,
            },
            storage: StorageConfig {
                data_dir: data_dir.display().to_string(),
                image_root: data_dir.join("images").display().to_string(),
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "community_sync=debug,info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("COMMUNITY_SYNC_DATABASE_URL") {
            let v = v.trim();
            if !v.is_empty() {
                cfg.database.url = v.to_string();
            }
        }
        if let Ok(v) = std::env::var("COMMUNITY_SYNC_DB_MAX_CONNECTIONS") {
            if let Some(value) = parse_u32(&v) {
                cfg.database.max_connections = value;
            }
        }
        if let Ok(v) = std::env::var("COMMUNITY_SYNC_IMAGE_ROOT") {
            let v = v.trim();
            if !v.is_empty() {
                cfg.storage.image_root = v.to_string();
            }
        }
        if let Ok(v) = std::env::var("COMMUNITY_SYNC_LOG_FILTER") {
            let v = v.trim();
            if !v.is_empty() {
                cfg.logging.filter = v.to_string();
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.storage.image_root.trim().is_empty() {
            return Err("Storage image_root must not be empty".to_string());
        }
        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("community-sync"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}
