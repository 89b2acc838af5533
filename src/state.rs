use crate::application::ports::{
    DocumentStore, IdentityProvider, ImageStorage, SessionCacheReader,
};
use crate::application::services::{MembershipService, PostService, SessionService, VoteService};
use crate::infrastructure::{
    AuthModalSignal, ConnectionPool, FsImageStorage, MemoryDocumentStore, SessionCacheService,
    SessionIdentity, SqliteDocumentStore,
};
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use crate::shared::keyed_lock::KeyedMutex;
use crate::shared::metrics::{SyncMetrics, SyncMetricsSnapshot};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Wires adapters, the session cache and the sync services together.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<SessionIdentity>,
    pub auth_modal: Arc<AuthModalSignal>,
    cache: Arc<SessionCacheService>,
    pub metrics: Arc<SyncMetrics>,
    pub vote_service: Arc<VoteService>,
    pub membership_service: Arc<MembershipService>,
    pub post_service: Arc<PostService>,
    pub session_service: Arc<SessionService>,
}

impl AppState {
    /// SQLite-backed state described by `config`.
    pub async fn new(config: &AppConfig) -> Result<Self, AppError> {
        config.validate().map_err(AppError::Configuration)?;

        tokio::fs::create_dir_all(&config.storage.data_dir).await?;
        tokio::fs::create_dir_all(&config.storage.image_root).await?;

        let pool = ConnectionPool::from_config(&config.database).await?;
        let store = SqliteDocumentStore::new(pool);
        store.initialize().await?;
        if !store.health_check().await? {
            return Err(AppError::Database(format!(
                "Document store at {} is not answering",
                config.database.url
            )));
        }
        info!(url = %config.database.url, "document store ready");

        Ok(Self::with_adapters(
            Arc::new(store),
            Arc::new(FsImageStorage::new(&config.storage.image_root)),
        ))
    }

    /// In-process state; images still go to `image_root`.
    pub fn in_memory(image_root: impl Into<PathBuf>) -> Self {
        Self::with_adapters(
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(FsImageStorage::new(image_root)),
        )
    }

    pub fn with_adapters(store: Arc<dyn DocumentStore>, images: Arc<dyn ImageStorage>) -> Self {
        let identity = Arc::new(SessionIdentity::new());
        let auth_modal = Arc::new(AuthModalSignal::new());
        let cache = Arc::new(SessionCacheService::new());
        let locks = Arc::new(KeyedMutex::new());
        let metrics = Arc::new(SyncMetrics::new());

        let vote_service = Arc::new(VoteService::new(
            store.clone(),
            identity.clone(),
            auth_modal.clone(),
            cache.clone(),
            locks.clone(),
            metrics.clone(),
        ));
        let membership_service = Arc::new(MembershipService::new(
            store.clone(),
            identity.clone(),
            auth_modal.clone(),
            cache.clone(),
            locks.clone(),
            metrics.clone(),
        ));
        let post_service = Arc::new(PostService::new(
            store.clone(),
            identity.clone(),
            auth_modal.clone(),
            images,
            cache.clone(),
            locks.clone(),
            metrics.clone(),
        ));
        let session_service = Arc::new(SessionService::new(
            store.clone(),
            cache.clone(),
            locks,
            metrics.clone(),
        ));

        Self {
            store,
            identity,
            auth_modal,
            cache,
            metrics,
            vote_service,
            membership_service,
            post_service,
            session_service,
        }
    }

    /// Read-only cache view for presentation code.
    pub fn cache_reader(&self) -> Arc<dyn SessionCacheReader> {
        self.cache.clone()
    }

    pub fn sync_metrics_snapshot(&self) -> SyncMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Starts hydrating the cache from identity changes in the background.
    pub fn start_session_sync(&self) -> JoinHandle<()> {
        Arc::clone(&self.session_service).spawn(self.identity.subscribe())
    }
}
