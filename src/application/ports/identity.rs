use crate::domain::value_objects::UserId;
use tokio::sync::watch;

/// Source of the signed-in user. The core only observes it.
pub trait IdentityProvider: Send + Sync {
    /// Current user, or `None` when signed out.
    fn current_user(&self) -> Option<UserId>;

    /// Receiver notified on every sign-in / sign-out.
    fn subscribe(&self) -> watch::Receiver<Option<UserId>>;
}
