pub mod config;
pub mod error;
pub mod keyed_lock;
pub mod metrics;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use keyed_lock::KeyedMutex;
pub use metrics::{SyncMetrics, SyncMetricsSnapshot};
