use super::action_outcome::{require_user, ActionOutcome};
use crate::application::ports::image_storage::post_image_path;
use crate::application::ports::{
    AuthPrompt, CollectionQuery, DocumentStore, IdentityProvider, ImageStorage, SessionCache,
    SortDirection,
};
use crate::domain::entities::{CacheMutation, Post, PostVote};
use crate::domain::value_objects::document_path::POSTS;
use crate::domain::value_objects::{CollectionPath, DocumentPath, VoteValue};
use crate::shared::error::AppError;
use crate::shared::keyed_lock::{post_key, KeyedMutex};
use crate::shared::metrics::SyncMetrics;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct PostService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    auth_prompt: Arc<dyn AuthPrompt>,
    images: Arc<dyn ImageStorage>,
    cache: Arc<dyn SessionCache>,
    locks: Arc<KeyedMutex>,
    metrics: Arc<SyncMetrics>,
}

impl PostService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        auth_prompt: Arc<dyn AuthPrompt>,
        images: Arc<dyn ImageStorage>,
        cache: Arc<dyn SessionCache>,
        locks: Arc<KeyedMutex>,
        metrics: Arc<SyncMetrics>,
    ) -> Self {
        Self {
            store,
            identity,
            auth_prompt,
            images,
            cache,
            locks,
            metrics,
        }
    }

    /// Loads a community's posts, newest first, into the cache.
    pub async fn load_community_posts(&self, community_id: &str) -> Result<Vec<Post>, AppError> {
        let posts_path = CollectionPath::root(POSTS).map_err(AppError::InvalidInput)?;
        let query = CollectionQuery::all(posts_path)
            .where_eq("communityId", community_id)
            .order_by("createdAt", SortDirection::Descending);

        let _exclusive = self.locks.lock_session().await;
        let posts: Vec<Post> = self
            .store
            .list(&query)
            .await?
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()?;

        debug!(community_id = %community_id, count = posts.len(), "posts loaded");
        self.cache
            .apply(vec![CacheMutation::ReplacePosts(posts.clone())])
            .await;
        Ok(posts)
    }

    /// Loads the signed-in user's votes within a community. Empty without a user.
    pub async fn load_community_post_votes(
        &self,
        community_id: &str,
    ) -> Result<Vec<PostVote>, AppError> {
        let Some(user) = self.identity.current_user() else {
            return Ok(Vec::new());
        };

        let query = CollectionQuery::all(
            CollectionPath::post_votes(&user).map_err(AppError::InvalidInput)?,
        )
        .where_eq("communityId", community_id);

        let _exclusive = self.locks.lock_session().await;
        let votes: Vec<PostVote> = self
            .store
            .list(&query)
            .await?
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()?;

        if self.identity.current_user().as_ref() == Some(&user) {
            self.cache
                .apply(vec![CacheMutation::ReplacePostVotes(votes.clone())])
                .await;
        }
        Ok(votes)
    }

    pub async fn select_post(&self, post: Option<Post>) {
        self.cache.apply(vec![CacheMutation::SelectPost(post)]).await;
    }

    /// Reads `posts/{id}` and makes it the selected post.
    pub async fn fetch_post(&self, post_id: &str) -> Result<Post, AppError> {
        let path = DocumentPath::post(post_id).map_err(AppError::InvalidInput)?;
        let document = self
            .store
            .get(&path)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post not found: {post_id}")))?;
        let post: Post = serde_json::from_value(document)?;

        self.select_post(Some(post.clone())).await;
        Ok(post)
    }

    pub async fn user_vote_value(&self, post_id: &str) -> Option<VoteValue> {
        self.cache
            .vote_for_post(post_id)
            .await
            .map(|vote| vote.vote_value)
    }

    /// Deletes a post created by the signed-in user, image first.
    pub async fn delete_post(&self, post: &Post) -> Result<ActionOutcome<()>, AppError> {
        let Some(user) = require_user(self.identity.as_ref(), self.auth_prompt.as_ref()) else {
            return Ok(ActionOutcome::AuthenticationRequired);
        };
        if !post.is_created_by(user.as_str()) {
            return Err(AppError::Forbidden(format!(
                "Post {} was not created by {user}",
                post.id
            )));
        }

        let _guard = self.locks.lock(&post_key(&post.id)).await;

        if post.has_image() {
            match self.images.delete_image(&post_image_path(&post.id)).await {
                Ok(()) => {}
                Err(AppError::NotFound(_)) => {
                    debug!(post_id = %post.id, "post image already gone");
                }
                Err(e) => {
                    self.metrics.post_deletes.record_failure();
                    warn!(post_id = %post.id, error = %e, "post image delete failed");
                    return Err(e);
                }
            }
        }

        let mut batch = self.store.begin_batch();
        batch.delete(DocumentPath::post(&post.id).map_err(AppError::InvalidInput)?);
        if let Err(e) = self.store.commit(batch).await {
            self.metrics.post_deletes.record_failure();
            warn!(post_id = %post.id, error = %e, "post delete failed");
            return Err(AppError::commit(e));
        }
        self.metrics.post_deletes.record_success();

        self.cache
            .apply(vec![CacheMutation::RemovePost {
                post_id: post.id.clone(),
            }])
            .await;
        info!(post_id = %post.id, "post deleted");
        Ok(ActionOutcome::Completed(()))
    }
}
