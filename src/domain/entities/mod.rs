pub mod community;
pub mod community_snippet;
pub mod post;
pub mod post_vote;
pub mod session_state;

pub use community::{Community, PrivacyType};
pub use community_snippet::CommunitySnippet;
pub use post::Post;
pub use post_vote::{PostVote, VoteChangeKind, VoteTransition};
pub use session_state::{CacheMutation, SessionState};
