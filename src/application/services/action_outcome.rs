use crate::application::ports::auth_prompt::{AuthPrompt, AuthView};
use crate::application::ports::identity::IdentityProvider;
use crate::domain::value_objects::UserId;

/// Result of a user-initiated action that needs a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome<T> {
    Completed(T),
    /// No user was signed in; the login prompt was raised and nothing was written.
    AuthenticationRequired,
}

impl<T> ActionOutcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            ActionOutcome::Completed(value) => Some(value),
            ActionOutcome::AuthenticationRequired => None,
        }
    }

    pub fn is_authentication_required(&self) -> bool {
        matches!(self, ActionOutcome::AuthenticationRequired)
    }
}

/// Current user, or `None` after raising the login prompt.
pub(crate) fn require_user(
    identity: &dyn IdentityProvider,
    auth_prompt: &dyn AuthPrompt,
) -> Option<UserId> {
    let user = identity.current_user();
    if user.is_none() {
        auth_prompt.request_login(AuthView::Login);
    }
    user
}
