pub mod action_outcome;
pub mod membership_service;
pub mod post_service;
pub mod session_service;
pub mod vote_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use action_outcome::ActionOutcome;
pub use membership_service::{MembershipChange, MembershipService};
pub use post_service::PostService;
pub use session_service::{HydrationState, SessionService};
pub use vote_service::{AppliedVote, VoteService};
