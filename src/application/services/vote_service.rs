use super::action_outcome::{require_user, ActionOutcome};
use crate::application::ports::{
    AuthPrompt, DocumentStore, FieldValue, IdentityProvider, SessionCache,
};
use crate::domain::entities::{CacheMutation, Post, PostVote, VoteChangeKind, VoteTransition};
use crate::domain::value_objects::{DocumentPath, UserId, VoteValue};
use crate::shared::error::AppError;
use crate::shared::keyed_lock::{post_key, KeyedMutex};
use crate::shared::metrics::SyncMetrics;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a committed vote click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedVote {
    pub post_id: String,
    pub kind: VoteChangeKind,
    pub delta: i64,
    /// The user's vote after the click, `None` when it was retracted.
    pub vote: Option<PostVote>,
    /// `false` when the signed-in user changed while the batch was in flight.
    pub cache_updated: bool,
}

pub struct VoteService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    auth_prompt: Arc<dyn AuthPrompt>,
    cache: Arc<dyn SessionCache>,
    locks: Arc<KeyedMutex>,
    metrics: Arc<SyncMetrics>,
}

impl VoteService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        auth_prompt: Arc<dyn AuthPrompt>,
        cache: Arc<dyn SessionCache>,
        locks: Arc<KeyedMutex>,
        metrics: Arc<SyncMetrics>,
    ) -> Self {
        Self {
            store,
            identity,
            auth_prompt,
            cache,
            locks,
            metrics,
        }
    }

    /// Casts, retracts or flips the signed-in user's vote on `post`.
    ///
    /// The vote record and the post's `voteStatus` increment are committed as one batch.
    /// The cache is only touched after the commit succeeds.
    pub async fn apply_vote(
        &self,
        post: &Post,
        vote_value: i64,
        community_id: &str,
    ) -> Result<ActionOutcome<AppliedVote>, AppError> {
        let requested = VoteValue::try_from(vote_value).map_err(AppError::InvalidInput)?;

        let Some(user) = require_user(self.identity.as_ref(), self.auth_prompt.as_ref()) else {
            debug!(post_id = %post.id, "vote requires authentication");
            return Ok(ActionOutcome::AuthenticationRequired);
        };

        let _guard = self.locks.lock(&post_key(&post.id)).await;

        let existing = self.cache.vote_for_post(&post.id).await;
        let transition = VoteTransition::plan(existing.as_ref(), requested, || {
            PostVote::new(post.id.clone(), community_id, requested)
        });
        let delta = transition.delta();

        let mut batch = self.store.begin_batch();
        let vote_path = DocumentPath::post_vote(&user, transition.vote_id())
            .map_err(AppError::InvalidInput)?;
        match &transition {
            VoteTransition::Cast(vote) => {
                batch.create(vote_path, serde_json::to_value(vote)?);
            }
            VoteTransition::Retract(_) => {
                batch.delete(vote_path);
            }
            VoteTransition::Flip { updated, .. } => {
                batch.update(
                    vote_path,
                    [("voteValue", FieldValue::Set(json!(updated.vote_value)))],
                );
            }
        }
        batch.update(
            DocumentPath::post(&post.id).map_err(AppError::InvalidInput)?,
            [("voteStatus", FieldValue::Increment(delta))],
        );

        if let Err(e) = self.store.commit(batch).await {
            self.metrics.vote_commits.record_failure();
            warn!(post_id = %post.id, error = %e, "vote commit failed");
            return Err(AppError::commit(e));
        }
        self.metrics.vote_commits.record_success();

        let cache_updated = self.apply_to_cache(&user, &post.id, &transition).await;
        info!(
            post_id = %post.id,
            kind = ?transition.kind(),
            delta,
            "vote committed"
        );

        Ok(ActionOutcome::Completed(AppliedVote {
            post_id: post.id.clone(),
            kind: transition.kind(),
            delta,
            vote: transition.resulting_vote().cloned(),
            cache_updated,
        }))
    }

    async fn apply_to_cache(
        &self,
        user: &UserId,
        post_id: &str,
        transition: &VoteTransition,
    ) -> bool {
        if self.identity.current_user().as_ref() != Some(user) {
            debug!(post_id = %post_id, "user changed during vote commit; cache left as is");
            return false;
        }

        let vote_mutation = match transition {
            VoteTransition::Cast(vote) => CacheMutation::AddPostVote(vote.clone()),
            VoteTransition::Retract(vote) => CacheMutation::RemovePostVote {
                vote_id: vote.id.clone(),
            },
            VoteTransition::Flip { updated, .. } => CacheMutation::UpdatePostVote(updated.clone()),
        };
        self.cache
            .apply(vec![
                CacheMutation::AdjustVoteStatus {
                    post_id: post_id.to_string(),
                    delta: transition.delta(),
                },
                vote_mutation,
            ])
            .await;
        true
    }
}
