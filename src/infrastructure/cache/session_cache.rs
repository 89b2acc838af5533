use crate::application::ports::cache::{SessionCache, SessionCacheReader};
use crate::domain::entities::{CacheMutation, CommunitySnippet, Post, PostVote, SessionState};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-resident session cache.
#[derive(Clone, Default)]
pub struct SessionCacheService {
    state: Arc<RwLock<SessionState>>,
}

impl SessionCacheService {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn apply(&self, mutations: Vec<CacheMutation>) {
        let mut state = self.state.write().await;
        for mutation in mutations {
            state.apply(mutation);
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl SessionCacheReader for SessionCacheService {
    async fn joined_snippets(&self) -> Vec<CommunitySnippet> {
        self.state.read().await.joined_snippets.clone()
    }

    async fn posts(&self) -> Vec<Post> {
        self.state.read().await.posts.clone()
    }

    async fn post_votes(&self) -> Vec<PostVote> {
        self.state.read().await.post_votes.clone()
    }

    async fn selected_post(&self) -> Option<Post> {
        self.state.read().await.selected_post.clone()
    }

    async fn post(&self, post_id: &str) -> Option<Post> {
        self.state.read().await.post(post_id).cloned()
    }

    async fn vote_for_post(&self, post_id: &str) -> Option<PostVote> {
        self.state.read().await.vote_for_post(post_id).cloned()
    }

    async fn is_member(&self, community_id: &str) -> bool {
        self.state.read().await.is_member(community_id)
    }

    async fn snapshot(&self) -> SessionState {
        SessionCacheService::snapshot(self).await
    }
}

#[async_trait]
impl SessionCache for SessionCacheService {
    async fn apply(&self, mutations: Vec<CacheMutation>) {
        SessionCacheService::apply(self, mutations).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::VoteValue;

    fn create_test_post(id: &str, vote_status: i64) -> Post {
        Post::new("rust", "u1", "Test title")
            .with_id(id)
            .with_vote_status(vote_status)
    }

    #[tokio::test]
    async fn test_apply_and_read_back() {
        let cache = SessionCacheService::new();
        cache
            .apply(vec![
                CacheMutation::ReplacePosts(vec![create_test_post("p1", 3)]),
                CacheMutation::AddSnippet(CommunitySnippet::new("rust", "")),
                CacheMutation::AddPostVote(PostVote::new("p1", "rust", VoteValue::Up)),
            ])
            .await;

        assert_eq!(cache.posts().await.len(), 1);
        assert!(cache.is_member("rust").await);
        assert_eq!(
            cache.vote_for_post("p1").await.unwrap().vote_value,
            VoteValue::Up
        );
        assert_eq!(cache.post("p1").await.unwrap().vote_status, 3);
    }

    #[tokio::test]
    async fn test_reader_view_shares_state() {
        let cache = SessionCacheService::new();
        let reader: Arc<dyn SessionCacheReader> = Arc::new(cache.clone());

        cache
            .apply(vec![CacheMutation::SelectPost(Some(create_test_post(
                "p9", 0,
            )))])
            .await;

        assert_eq!(reader.selected_post().await.unwrap().id, "p9");
        assert_eq!(reader.post("p9").await.unwrap().id, "p9");
    }

    #[tokio::test]
    async fn test_snapshot_is_detached_copy() {
        let cache = SessionCacheService::new();
        cache
            .apply(vec![CacheMutation::ReplacePosts(vec![create_test_post(
                "p1", 1,
            )])])
            .await;
        let before = cache.snapshot().await;

        cache
            .apply(vec![CacheMutation::AdjustVoteStatus {
                post_id: "p1".to_string(),
                delta: 1,
            }])
            .await;

        assert_eq!(before.posts[0].vote_status, 1);
        assert_eq!(cache.snapshot().await.posts[0].vote_status, 2);
    }
}
