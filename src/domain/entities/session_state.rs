use super::{CommunitySnippet, Post, PostVote};

/// Everything the client mirrors locally for the signed-in session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub joined_snippets: Vec<CommunitySnippet>,
    pub posts: Vec<Post>,
    pub selected_post: Option<Post>,
    pub post_votes: Vec<PostVote>,
}

/// A single write against [`SessionState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheMutation {
    ReplaceSnippets(Vec<CommunitySnippet>),
    AddSnippet(CommunitySnippet),
    RemoveSnippet { community_id: String },
    ReplacePosts(Vec<Post>),
    AdjustVoteStatus { post_id: String, delta: i64 },
    RemovePost { post_id: String },
    SelectPost(Option<Post>),
    ReplacePostVotes(Vec<PostVote>),
    AddPostVote(PostVote),
    UpdatePostVote(PostVote),
    RemovePostVote { vote_id: String },
    ClearUserState,
}

impl SessionState {
    pub fn apply(&mut self, mutation: CacheMutation) {
        match mutation {
            CacheMutation::ReplaceSnippets(snippets) => {
                self.joined_snippets = snippets;
            }
            CacheMutation::AddSnippet(snippet) => {
                self.joined_snippets
                    .retain(|item| item.community_id != snippet.community_id);
                self.joined_snippets.push(snippet);
            }
            CacheMutation::RemoveSnippet { community_id } => {
                self.joined_snippets
                    .retain(|item| item.community_id != community_id);
            }
            CacheMutation::ReplacePosts(posts) => {
                self.posts = posts;
            }
            CacheMutation::AdjustVoteStatus { post_id, delta } => {
                if let Some(post) = self.posts.iter_mut().find(|post| post.id == post_id) {
                    post.apply_vote_delta(delta);
                }
                if let Some(post) = self
                    .selected_post
                    .as_mut()
                    .filter(|post| post.id == post_id)
                {
                    post.apply_vote_delta(delta);
                }
            }
            CacheMutation::RemovePost { post_id } => {
                self.posts.retain(|post| post.id != post_id);
                if self
                    .selected_post
                    .as_ref()
                    .is_some_and(|post| post.id == post_id)
                {
                    self.selected_post = None;
                }
            }
            CacheMutation::SelectPost(post) => {
                self.selected_post = post;
            }
            CacheMutation::ReplacePostVotes(votes) => {
                self.post_votes = votes;
            }
            CacheMutation::AddPostVote(vote) => {
                // at most one vote per post
                self.post_votes.retain(|item| item.post_id != vote.post_id);
                self.post_votes.push(vote);
            }
            CacheMutation::UpdatePostVote(vote) => {
                if let Some(slot) = self.post_votes.iter_mut().find(|item| item.id == vote.id) {
                    *slot = vote;
                }
            }
            CacheMutation::RemovePostVote { vote_id } => {
                self.post_votes.retain(|item| item.id != vote_id);
            }
            CacheMutation::ClearUserState => {
                self.joined_snippets.clear();
                self.post_votes.clear();
            }
        }
    }

    pub fn vote_for_post(&self, post_id: &str) -> Option<&PostVote> {
        self.post_votes.iter().find(|vote| vote.post_id == post_id)
    }

    pub fn is_member(&self, community_id: &str) -> bool {
        self.joined_snippets
            .iter()
            .any(|snippet| snippet.community_id == community_id)
    }

    /// Looks in the loaded list first, then the selected post.
    pub fn post(&self, post_id: &str) -> Option<&Post> {
        self.posts
            .iter()
            .find(|post| post.id == post_id)
            .or_else(|| self.selected_post.as_ref().filter(|post| post.id == post_id))
    }
}
