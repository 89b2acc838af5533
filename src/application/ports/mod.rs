pub mod auth_prompt;
pub mod cache;
pub mod document_store;
pub mod identity;
pub mod image_storage;

pub use auth_prompt::{AuthPrompt, AuthView};
pub use cache::{SessionCache, SessionCacheReader};
pub use document_store::{
    BatchOperation, CollectionQuery, DocumentStore, FieldValue, SortDirection, WriteBatch,
};
pub use identity::IdentityProvider;
pub use image_storage::ImageStorage;
