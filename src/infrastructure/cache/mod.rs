pub mod session_cache;

pub use session_cache::SessionCacheService;
