pub mod connection_pool;
pub mod memory_store;
pub mod sqlite_store;

pub use connection_pool::ConnectionPool;
pub use memory_store::MemoryDocumentStore;
pub use sqlite_store::SqliteDocumentStore;
