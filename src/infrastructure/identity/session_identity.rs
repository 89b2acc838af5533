use crate::application::ports::identity::IdentityProvider;
use crate::domain::value_objects::UserId;
use tokio::sync::watch;
use tracing::info;

/// Signed-in user held in a watch channel; sign-in/out notify every subscriber.
pub struct SessionIdentity {
    sender: watch::Sender<Option<UserId>>,
}

impl SessionIdentity {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    pub fn signed_in(user: UserId) -> Self {
        let (sender, _) = watch::channel(Some(user));
        Self { sender }
    }

    pub fn sign_in(&self, user: UserId) {
        info!(user = %user, "user signed in");
        self.sender.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        if self.sender.send_replace(None).is_some() {
            info!("user signed out");
        }
    }
}

impl Default for SessionIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_user(&self) -> Option<UserId> {
        self.sender.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserId>> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[test]
    fn test_sign_in_and_out() {
        let identity = SessionIdentity::new();
        assert!(identity.current_user().is_none());

        identity.sign_in(user("alice"));
        assert_eq!(identity.current_user(), Some(user("alice")));

        identity.sign_out();
        assert!(identity.current_user().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_observe_changes() {
        let identity = SessionIdentity::new();
        let mut rx = identity.subscribe();

        identity.sign_in(user("bob"));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(user("bob")));

        identity.sign_out();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }
}
