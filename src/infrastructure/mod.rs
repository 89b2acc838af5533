pub mod cache;
pub mod database;
pub mod identity;
pub mod storage;

pub use cache::SessionCacheService;
pub use database::{ConnectionPool, MemoryDocumentStore, SqliteDocumentStore};
pub use identity::{AuthModalSignal, AuthModalState, SessionIdentity};
pub use storage::FsImageStorage;
