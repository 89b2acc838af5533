use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Async mutex per logical key (`post:{id}`, `community:{id}`), behind a session-wide gate.
///
/// Callers queue in FIFO order on the same key; different keys never block each other.
/// Every key holder shares the session gate, so [`KeyedMutex::lock_session`] waits for all
/// in-flight keyed work and holds new work back until it is dropped.
#[derive(Default)]
pub struct KeyedMutex {
    session: RwLock<()>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Held while a keyed action runs.
pub struct KeyGuard<'a> {
    _key: OwnedMutexGuard<()>,
    _session: RwLockReadGuard<'a, ()>,
}

impl KeyedMutex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session gate is taken before the key, never the other way round.
    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        let session = self.session.read().await;
        let entry = {
            let mut guard = self.locks.lock().await;
            // Entries only referenced by the map have no holder and no waiter.
            guard.retain(|existing, lock| existing == key || Arc::strong_count(lock) > 1);
            guard
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        KeyGuard {
            _key: entry.lock_owned().await,
            _session: session,
        }
    }

    /// Excludes every keyed action, for work that replaces whole cache slices.
    pub async fn lock_session(&self) -> RwLockWriteGuard<'_, ()> {
        self.session.write().await
    }

    pub async fn tracked_keys(&self) -> usize {
        self.locks.lock().await.len()
    }
}

pub fn post_key(post_id: &str) -> String {
    format!("post:{post_id}")
}

pub fn community_key(community_id: &str) -> String {
    format!("community:{community_id}")
}
