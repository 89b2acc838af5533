use crate::domain::entities::{CacheMutation, CommunitySnippet, Post, PostVote, SessionState};
use async_trait::async_trait;

/// Read-only view of the session cache handed to presentation code.
#[async_trait]
pub trait SessionCacheReader: Send + Sync {
    /// Communities the signed-in user has joined
    async fn joined_snippets(&self) -> Vec<CommunitySnippet>;

    /// Currently loaded posts
    async fn posts(&self) -> Vec<Post>;

    /// The user's votes on loaded posts
    async fn post_votes(&self) -> Vec<PostVote>;

    async fn selected_post(&self) -> Option<Post>;

    /// Loaded list first, then the selected post
    async fn post(&self, post_id: &str) -> Option<Post>;

    async fn vote_for_post(&self, post_id: &str) -> Option<PostVote>;

    async fn is_member(&self, community_id: &str) -> bool;

    /// Full copy of the cached state
    async fn snapshot(&self) -> SessionState;
}

/// Write side, reserved for the sync services and hydration.
#[async_trait]
pub trait SessionCache: SessionCacheReader {
    /// Applies the mutations in order under a single write lock.
    async fn apply(&self, mutations: Vec<CacheMutation>);
}
