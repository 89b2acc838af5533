pub mod document_path;
pub mod user_id;
pub mod vote_value;

pub use document_path::{CollectionPath, DocumentPath};
pub use user_id::UserId;
pub use vote_value::VoteValue;
