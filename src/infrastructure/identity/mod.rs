pub mod auth_modal;
pub mod session_identity;

pub use auth_modal::{AuthModalSignal, AuthModalState};
pub use session_identity::SessionIdentity;
