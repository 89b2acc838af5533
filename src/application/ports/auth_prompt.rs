use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthView {
    #[default]
    Login,
    SignUp,
    ResetPassword,
}

/// Receives the "authentication required" signal raised by mutating actions.
pub trait AuthPrompt: Send + Sync {
    fn request_login(&self, view: AuthView);
}
