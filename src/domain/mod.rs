pub mod entities;
pub mod value_objects;

pub use entities::{
    CacheMutation, Community, CommunitySnippet, Post, PostVote, SessionState, VoteChangeKind,
    VoteTransition,
};
pub use value_objects::{CollectionPath, DocumentPath, UserId, VoteValue};
