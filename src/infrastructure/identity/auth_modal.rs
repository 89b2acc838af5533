use crate::application::ports::auth_prompt::{AuthPrompt, AuthView};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthModalState {
    pub open: bool,
    pub view: AuthView,
}

/// Login modal state published to the UI layer.
pub struct AuthModalSignal {
    sender: watch::Sender<AuthModalState>,
}

impl AuthModalSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(AuthModalState::default());
        Self { sender }
    }

    pub fn state(&self) -> AuthModalState {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthModalState> {
        self.sender.subscribe()
    }

    pub fn close(&self) {
        self.sender.send_modify(|state| state.open = false);
    }
}

impl Default for AuthModalSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthPrompt for AuthModalSignal {
    fn request_login(&self, view: AuthView) {
        debug!(?view, "authentication required");
        self.sender.send_replace(AuthModalState { open: true, view });
    }
}
