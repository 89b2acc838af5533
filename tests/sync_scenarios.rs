use community_sync::application::ports::{DocumentStore, SessionCacheReader};
use community_sync::domain::entities::{Community, Post};
use community_sync::domain::value_objects::{DocumentPath, UserId, VoteValue};
use community_sync::infrastructure::{FsImageStorage, MemoryDocumentStore};
use community_sync::{ActionOutcome, AppError, AppState, HydrationState, MembershipChange};
use std::sync::Arc;
use tempfile::TempDir;

struct Harness {
    state: AppState,
    store: Arc<MemoryDocumentStore>,
    _images: TempDir,
}

impl Harness {
    fn new() -> Self {
        let images = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryDocumentStore::new());
        let state = AppState::with_adapters(
            store.clone(),
            Arc::new(FsImageStorage::new(images.path())),
        );
        Self {
            state,
            store,
            _images: images,
        }
    }

    async fn sign_in(&self, user: &str) {
        let user = UserId::new(user).unwrap();
        self.state.identity.sign_in(user.clone());
        self.state
            .session_service
            .on_identity_changed(Some(user))
            .await
            .unwrap();
    }

    async fn seed_post(&self, id: &str, vote_status: i64) -> Post {
        let post = Post::new("rust", "author", "hello")
            .with_id(id)
            .with_vote_status(vote_status);
        self.store
            .put(
                DocumentPath::post(id).unwrap(),
                serde_json::to_value(&post).unwrap(),
            )
            .await;
        self.state
            .post_service
            .load_community_posts("rust")
            .await
            .unwrap();
        post
    }

    async fn seed_community(&self, id: &str, members: i64) -> Community {
        let community = Community::new(id, "founder").with_members(members);
        self.store
            .put(
                DocumentPath::community(id).unwrap(),
                serde_json::to_value(&community).unwrap(),
            )
            .await;
        community
    }

    async fn stored_field(&self, path: DocumentPath, field: &str) -> i64 {
        self.store.document(&path).await.unwrap()[field]
            .as_i64()
            .unwrap()
    }

    async fn cached_vote_status(&self, post_id: &str) -> i64 {
        self.state.cache_reader().post(post_id).await.unwrap().vote_status
    }
}

#[tokio::test]
async fn vote_click_sequence_matches_store_and_cache() {
    let harness = Harness::new();
    harness.sign_in("alice").await;
    let post = harness.seed_post("p1", 5).await;

    let mut observed = vec![harness.cached_vote_status("p1").await];
    for value in [1, 1, -1, 1] {
        let outcome = harness
            .state
            .vote_service
            .apply_vote(&post, value, "rust")
            .await
            .unwrap();
        assert!(!outcome.is_authentication_required());
        observed.push(harness.cached_vote_status("p1").await);
    }

    assert_eq!(observed, vec![5, 6, 5, 4, 6]);
    assert_eq!(
        harness
            .stored_field(DocumentPath::post("p1").unwrap(), "voteStatus")
            .await,
        6
    );
    let votes = harness.state.cache_reader().post_votes().await;
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].vote_value, VoteValue::Up);
}

#[tokio::test]
async fn votes_survive_a_fresh_session() {
    let harness = Harness::new();
    harness.sign_in("alice").await;
    let post = harness.seed_post("p1", 0).await;
    harness
        .state
        .vote_service
        .apply_vote(&post, -1, "rust")
        .await
        .unwrap();

    harness
        .state
        .session_service
        .on_identity_changed(None)
        .await
        .unwrap();
    harness.state.identity.sign_out();
    assert!(harness.state.cache_reader().post_votes().await.is_empty());

    harness.sign_in("alice").await;
    assert_eq!(
        harness.state.post_service.user_vote_value("p1").await,
        Some(VoteValue::Down)
    );
}

#[tokio::test]
async fn join_then_leave_restores_member_count() {
    let harness = Harness::new();
    harness.sign_in("alice").await;
    let community = harness.seed_community("rust", 10).await;
    let members_path = DocumentPath::community("rust").unwrap();

    let joined = harness
        .state
        .membership_service
        .toggle_membership(&community, false)
        .await
        .unwrap();
    assert!(matches!(
        joined,
        ActionOutcome::Completed(MembershipChange::Joined(_))
    ));
    assert_eq!(harness.stored_field(members_path.clone(), "numberOfMembers").await, 11);
    assert!(harness.state.cache_reader().is_member("rust").await);

    harness
        .state
        .membership_service
        .toggle_membership(&community, true)
        .await
        .unwrap();
    assert_eq!(harness.stored_field(members_path, "numberOfMembers").await, 10);
    assert!(harness.state.cache_reader().joined_snippets().await.is_empty());
}

#[tokio::test]
async fn failed_commit_keeps_cache_snapshot() {
    let harness = Harness::new();
    harness.sign_in("alice").await;
    let post = harness.seed_post("p1", 3).await;
    let community = harness.seed_community("rust", 2).await;
    let before = harness.state.cache_reader().snapshot().await;

    harness.store.set_commit_failure(Some("permission denied")).await;

    let vote = harness.state.vote_service.apply_vote(&post, 1, "rust").await;
    let join = harness
        .state
        .membership_service
        .toggle_membership(&community, false)
        .await;

    assert!(matches!(vote, Err(AppError::StoreCommit(_))));
    assert!(matches!(join, Err(AppError::StoreCommit(_))));
    assert_eq!(harness.state.cache_reader().snapshot().await, before);

    let metrics = harness.state.sync_metrics_snapshot();
    assert_eq!(metrics.vote_commits.failures, 1);
    assert_eq!(metrics.membership_commits.failures, 1);
}

#[tokio::test]
async fn signed_out_actions_raise_login_prompt() {
    let harness = Harness::new();
    let post = harness.seed_post("p1", 0).await;
    let community = harness.seed_community("rust", 1).await;

    let vote = harness
        .state
        .vote_service
        .apply_vote(&post, 1, "rust")
        .await
        .unwrap();
    let join = harness
        .state
        .membership_service
        .toggle_membership(&community, false)
        .await
        .unwrap();

    assert!(vote.is_authentication_required());
    assert!(join.is_authentication_required());
    assert!(harness.state.auth_modal.state().open);
    assert_eq!(harness.store.commit_count(), 0);
}

#[tokio::test]
async fn concurrent_votes_on_one_post_resolve_consistently() {
    let harness = Harness::new();
    harness.sign_in("alice").await;
    let post = harness.seed_post("p1", 0).await;

    let service = harness.state.vote_service.clone();
    let tasks: Vec<_> = [1, -1, 1, -1, -1]
        .into_iter()
        .map(|value| {
            let service = service.clone();
            let post = post.clone();
            tokio::spawn(async move { service.apply_vote(&post, value, "rust").await })
        })
        .collect();
    for task in futures::future::join_all(tasks).await {
        task.unwrap().unwrap();
    }

    let stored = harness
        .stored_field(DocumentPath::post("p1").unwrap(), "voteStatus")
        .await;
    let votes = harness.state.cache_reader().post_votes().await;
    assert!(votes.len() <= 1);
    let expected: i64 = votes.iter().map(|vote| vote.vote_value.as_i64()).sum();
    assert_eq!(stored, expected);
    assert_eq!(harness.cached_vote_status("p1").await, stored);
}

#[tokio::test]
async fn repeated_sign_in_hydrates_once() {
    let harness = Harness::new();
    let alice = UserId::new("alice").unwrap();

    harness.sign_in("alice").await;
    let reads = harness.store.read_count();
    let state = harness
        .state
        .session_service
        .on_identity_changed(Some(alice.clone()))
        .await
        .unwrap();

    assert_eq!(state, HydrationState::Ready(alice));
    assert_eq!(harness.store.read_count(), reads);
}

#[tokio::test]
async fn deleting_own_post_clears_selection() {
    let harness = Harness::new();
    harness.sign_in("author").await;
    let post = harness.seed_post("p1", 0).await;
    harness
        .state
        .post_service
        .select_post(Some(post.clone()))
        .await;

    let outcome = harness.state.post_service.delete_post(&post).await.unwrap();

    assert_eq!(outcome, ActionOutcome::Completed(()));
    assert!(harness.state.cache_reader().selected_post().await.is_none());
    assert!(harness.state.cache_reader().posts().await.is_empty());
    assert!(harness
        .store
        .get(&DocumentPath::post("p1").unwrap())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn actions_during_hydration_are_not_overwritten() {
    let harness = Harness::new();
    let post = harness.seed_post("p1", 0).await;
    let community = harness.seed_community("rust", 0).await;
    let alice = UserId::new("alice").unwrap();
    harness.state.identity.sign_in(alice.clone());
    harness.store.pause_reads();

    let hydration = {
        let state = harness.state.clone();
        let alice = alice.clone();
        tokio::spawn(async move { state.session_service.on_identity_changed(Some(alice)).await })
    };
    while harness.store.read_count() < 1 {
        tokio::task::yield_now().await;
    }

    let join = {
        let state = harness.state.clone();
        let community = community.clone();
        tokio::spawn(async move {
            state
                .membership_service
                .toggle_membership(&community, false)
                .await
        })
    };
    let vote = {
        let state = harness.state.clone();
        let post = post.clone();
        tokio::spawn(async move { state.vote_service.apply_vote(&post, 1, "rust").await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    harness.store.resume_reads();

    assert_eq!(hydration.await.unwrap().unwrap(), HydrationState::Ready(alice));
    join.await.unwrap().unwrap();
    vote.await.unwrap().unwrap();
    assert!(harness.state.cache_reader().is_member("rust").await);
    assert!(harness.state.cache_reader().vote_for_post("p1").await.is_some());

    let again = harness
        .state
        .membership_service
        .toggle_membership(&community, false)
        .await
        .unwrap();
    assert_eq!(again, ActionOutcome::Completed(MembershipChange::Unchanged));
    assert_eq!(
        harness
            .stored_field(DocumentPath::community("rust").unwrap(), "numberOfMembers")
            .await,
        1
    );

    harness
        .state
        .vote_service
        .apply_vote(&post, 1, "rust")
        .await
        .unwrap();
    assert_eq!(
        harness
            .stored_field(DocumentPath::post("p1").unwrap(), "voteStatus")
            .await,
        0
    );
    assert!(harness.state.cache_reader().post_votes().await.is_empty());
}
