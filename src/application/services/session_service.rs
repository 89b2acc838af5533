use crate::application::ports::{CollectionQuery, DocumentStore, SessionCache};
use crate::domain::entities::{CacheMutation, CommunitySnippet, PostVote};
use crate::domain::value_objects::{CollectionPath, UserId};
use crate::shared::error::AppError;
use crate::shared::keyed_lock::KeyedMutex;
use crate::shared::metrics::SyncMetrics;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Where the per-user cache slices stand relative to the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HydrationState {
    #[default]
    Unknown,
    Loading(UserId),
    Ready(UserId),
    /// Signed out; per-user slices are cleared.
    Empty,
}

impl HydrationState {
    pub fn user(&self) -> Option<&UserId> {
        match self {
            HydrationState::Loading(user) | HydrationState::Ready(user) => Some(user),
            HydrationState::Unknown | HydrationState::Empty => None,
        }
    }
}

struct HydrationTracker {
    state: HydrationState,
    /// Bumped on every accepted identity change; loads from older generations are dropped.
    generation: u64,
}

pub struct SessionService {
    store: Arc<dyn DocumentStore>,
    cache: Arc<dyn SessionCache>,
    locks: Arc<KeyedMutex>,
    metrics: Arc<SyncMetrics>,
    tracker: Mutex<HydrationTracker>,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        cache: Arc<dyn SessionCache>,
        locks: Arc<KeyedMutex>,
        metrics: Arc<SyncMetrics>,
    ) -> Self {
        Self {
            store,
            cache,
            locks,
            metrics,
            tracker: Mutex::new(HydrationTracker {
                state: HydrationState::Unknown,
                generation: 0,
            }),
        }
    }

    pub async fn state(&self) -> HydrationState {
        self.tracker.lock().await.state.clone()
    }

    /// Reacts to a sign-in or sign-out and returns the resulting state.
    ///
    /// A repeated request for the user already loading or loaded is ignored.
    pub async fn on_identity_changed(
        &self,
        user: Option<UserId>,
    ) -> Result<HydrationState, AppError> {
        let Some(user) = user else {
            return Ok(self.sign_out().await);
        };

        let generation = {
            let mut tracker = self.tracker.lock().await;
            if tracker.state.user() == Some(&user) {
                debug!(user = %user, state = ?tracker.state, "hydration already requested");
                return Ok(tracker.state.clone());
            }
            if tracker.state.user().is_some() {
                self.cache.apply(vec![CacheMutation::ClearUserState]).await;
            }
            tracker.generation += 1;
            tracker.state = HydrationState::Loading(user.clone());
            tracker.generation
        };

        // Keyed actions wait until the loaded slices are in place.
        let _exclusive = self.locks.lock_session().await;
        let loaded = self.load_user_state(&user).await;

        let mut tracker = self.tracker.lock().await;
        if tracker.generation != generation {
            debug!(user = %user, "discarding superseded hydration");
            return Ok(tracker.state.clone());
        }

        match loaded {
            Ok((snippets, votes)) => {
                info!(
                    user = %user,
                    snippets = snippets.len(),
                    votes = votes.len(),
                    "session hydrated"
                );
                self.cache
                    .apply(vec![
                        CacheMutation::ReplaceSnippets(snippets),
                        CacheMutation::ReplacePostVotes(votes),
                    ])
                    .await;
                self.metrics.hydrations.record_success();
                tracker.state = HydrationState::Ready(user);
                Ok(tracker.state.clone())
            }
            Err(e) => {
                self.metrics.hydrations.record_failure();
                warn!(user = %user, error = %e, "hydration failed");
                tracker.state = HydrationState::Unknown;
                Err(e)
            }
        }
    }

    /// Follows identity changes until the sender is dropped.
    ///
    /// Changes are handled one at a time in arrival order; values superseded while a load
    /// runs are skipped in favour of the latest one.
    pub async fn run(&self, mut identity: watch::Receiver<Option<UserId>>) {
        loop {
            let user = identity.borrow_and_update().clone();
            if let Err(e) = self.on_identity_changed(user).await {
                warn!(error = %e, "identity change not applied");
            }

            if identity.changed().await.is_err() {
                debug!("identity source closed");
                break;
            }
        }
    }

    pub fn spawn(self: Arc<Self>, identity: watch::Receiver<Option<UserId>>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(identity).await })
    }

    async fn sign_out(&self) -> HydrationState {
        let mut tracker = self.tracker.lock().await;
        tracker.generation += 1;
        if tracker.state != HydrationState::Empty {
            info!("clearing per-user session state");
            self.cache.apply(vec![CacheMutation::ClearUserState]).await;
        }
        tracker.state = HydrationState::Empty;
        tracker.state.clone()
    }

    async fn load_user_state(
        &self,
        user: &UserId,
    ) -> Result<(Vec<CommunitySnippet>, Vec<PostVote>), AppError> {
        let snippets_path =
            CollectionPath::community_snippets(user).map_err(AppError::InvalidInput)?;
        let votes_path = CollectionPath::post_votes(user).map_err(AppError::InvalidInput)?;

        let snippets = self.read_collection(snippets_path).await?;
        let votes = self.read_collection(votes_path).await?;
        Ok((snippets, votes))
    }

    async fn read_collection<T: DeserializeOwned>(
        &self,
        collection: CollectionPath,
    ) -> Result<Vec<T>, AppError> {
        let documents = self
            .store
            .list(&CollectionQuery::all(collection))
            .await
            .map_err(AppError::hydration)?;

        documents
            .into_iter()
            .map(|document| {
                serde_json::from_value(document)
                    .map_err(|e| AppError::hydration(AppError::from(e)))
            })
            .collect()
    }
}
