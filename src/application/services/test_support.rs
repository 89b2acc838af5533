use crate::application::ports::{AuthPrompt, DocumentStore, IdentityProvider, SessionCache};
use crate::domain::entities::{Community, Post};
use crate::domain::value_objects::{DocumentPath, UserId};
use crate::infrastructure::{
    AuthModalSignal, MemoryDocumentStore, SessionCacheService, SessionIdentity,
};
use crate::shared::{KeyedMutex, SyncMetrics};
use std::sync::Arc;

/// In-memory adapters wired the same way the application state wires them.
pub(crate) struct Fixture {
    pub store: Arc<MemoryDocumentStore>,
    pub identity: Arc<SessionIdentity>,
    pub modal: Arc<AuthModalSignal>,
    pub cache: Arc<SessionCacheService>,
    pub locks: Arc<KeyedMutex>,
    pub metrics: Arc<SyncMetrics>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryDocumentStore::new()),
            identity: Arc::new(SessionIdentity::new()),
            modal: Arc::new(AuthModalSignal::new()),
            cache: Arc::new(SessionCacheService::new()),
            locks: Arc::new(KeyedMutex::new()),
            metrics: Arc::new(SyncMetrics::new()),
        }
    }

    pub fn signed_in(user: &str) -> Self {
        let fixture = Self::new();
        fixture.identity.sign_in(user_id(user));
        fixture
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        self.store.clone()
    }

    pub fn identity(&self) -> Arc<dyn IdentityProvider> {
        self.identity.clone()
    }

    pub fn prompt(&self) -> Arc<dyn AuthPrompt> {
        self.modal.clone()
    }

    pub fn cache(&self) -> Arc<dyn SessionCache> {
        self.cache.clone()
    }

    pub async fn seed_post(&self, post: &Post) {
        self.store
            .put(
                DocumentPath::post(&post.id).unwrap(),
                serde_json::to_value(post).unwrap(),
            )
            .await;
    }

    pub async fn seed_community(&self, community: &Community) {
        self.store
            .put(
                DocumentPath::community(&community.id).unwrap(),
                serde_json::to_value(community).unwrap(),
            )
            .await;
    }

    pub async fn stored_vote_status(&self, post_id: &str) -> i64 {
        self.store
            .document(&DocumentPath::post(post_id).unwrap())
            .await
            .and_then(|doc| doc["voteStatus"].as_i64())
            .unwrap()
    }

    pub async fn stored_members(&self, community_id: &str) -> i64 {
        self.store
            .document(&DocumentPath::community(community_id).unwrap())
            .await
            .and_then(|doc| doc["numberOfMembers"].as_i64())
            .unwrap()
    }
}

pub(crate) fn user_id(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

pub(crate) fn create_test_post(id: &str, vote_status: i64) -> Post {
    Post::new("rust", "author", format!("Post {id}"))
        .with_id(id)
        .with_vote_status(vote_status)
}
