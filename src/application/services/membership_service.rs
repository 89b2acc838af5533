use super::action_outcome::{require_user, ActionOutcome};
use crate::application::ports::{
    AuthPrompt, DocumentStore, FieldValue, IdentityProvider, SessionCache, WriteBatch,
};
use crate::domain::entities::{CacheMutation, Community, CommunitySnippet};
use crate::domain::value_objects::{DocumentPath, UserId};
use crate::shared::error::AppError;
use crate::shared::keyed_lock::{community_key, KeyedMutex};
use crate::shared::metrics::SyncMetrics;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipChange {
    Joined(CommunitySnippet),
    Left { community_id: String },
    /// The cache already reflects the requested transition; nothing was committed.
    Unchanged,
}

pub struct MembershipService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    auth_prompt: Arc<dyn AuthPrompt>,
    cache: Arc<dyn SessionCache>,
    locks: Arc<KeyedMutex>,
    metrics: Arc<SyncMetrics>,
}

impl MembershipService {
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

    /// Leaves `community` when `is_currently_joined`, joins it otherwise.
    pub async fn toggle_membership(
        &self,
        community: &Community,
        is_currently_joined: bool,
    ) -> Result<ActionOutcome<MembershipChange>, AppError> {
        let Some(user) = require_user(self.identity.as_ref(), self.auth_prompt.as_ref()) else {
            debug!(community_id = %community.id, "membership change requires authentication");
            return Ok(ActionOutcome::AuthenticationRequired);
        };

        let _guard = self.locks.lock(&community_key(&community.id)).await;

        if self.cache.is_member(&community.id).await != is_currently_joined {
            debug!(
                community_id = %community.id,
                is_currently_joined,
                "membership already changed by an earlier action"
            );
            return Ok(ActionOutcome::Completed(MembershipChange::Unchanged));
        }

        let change = if is_currently_joined {
            self.leave(&user, community).await?
        } else {
            self.join(&user, community).await?
        };

        Ok(ActionOutcome::Completed(change))
    }

    async fn join(
        &self,
        user: &UserId,
        community: &Community,
    ) -> Result<MembershipChange, AppError> {
        let snippet = CommunitySnippet::for_community(community);

        let mut batch = self.store.begin_batch();
        batch
            .create(
                DocumentPath::community_snippet(user, &community.id)
                    .map_err(AppError::InvalidInput)?,
                serde_json::to_value(&snippet)?,
            )
            .update(
                DocumentPath::community(&community.id).map_err(AppError::InvalidInput)?,
                [("numberOfMembers", FieldValue::Increment(1))],
            );

        self.commit(batch, &community.id).await?;
        info!(community_id = %community.id, "joined community");

        self.apply_to_cache(user, CacheMutation::AddSnippet(snippet.clone()))
            .await;
        Ok(MembershipChange::Joined(snippet))
    }

    async fn leave(
        &self,
        user: &UserId,
        community: &Community,
    ) -> Result<MembershipChange, AppError> {
        let mut batch = self.store.begin_batch();
        batch
            .delete(
                DocumentPath::community_snippet(user, &community.id)
                    .map_err(AppError::InvalidInput)?,
            )
            .update(
                DocumentPath::community(&community.id).map_err(AppError::InvalidInput)?,
                [("numberOfMembers", FieldValue::Increment(-1))],
            );

        self.commit(batch, &community.id).await?;
        info!(community_id = %community.id, "left community");

        self.apply_to_cache(
            user,
            CacheMutation::RemoveSnippet {
                community_id: community.id.clone(),
            },
        )
        .await;
        Ok(MembershipChange::Left {
            community_id: community.id.clone(),
        })
    }

    async fn commit(
        &self,
        batch: WriteBatch,
        community_id: &str,
    ) -> Result<(), AppError> {
        match self.store.commit(batch).await {
            Ok(()) => {
                self.metrics.membership_commits.record_success();
                Ok(())
            }
            Err(e) => {
                self.metrics.membership_commits.record_failure();
                warn!(community_id = %community_id, error = %e, "membership commit failed");
                Err(AppError::commit(e))
            }
        }
    }

    async fn apply_to_cache(&self, user: &UserId, mutation: CacheMutation) {
        if self.identity.current_user().as_ref() != Some(user) {
            debug!("user changed during membership commit; cache left as is");
            return;
        }
        self.cache.apply(vec![mutation]).await;
    }
}
