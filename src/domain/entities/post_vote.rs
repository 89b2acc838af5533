use crate::domain::value_objects::VoteValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostVote {
    pub id: String,
    pub post_id: String,
    pub community_id: String,
    pub vote_value: VoteValue,
}

impl PostVote {
    pub fn new(
        post_id: impl Into<String>,
        community_id: impl Into<String>,
        vote_value: VoteValue,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            post_id: post_id.into(),
            community_id: community_id.into(),
            vote_value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChangeKind {
    Cast,
    Retract,
    Flip,
}

/// What one vote click does to the user's PostVote and to the post's running total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteTransition {
    /// No prior vote: a new record is created.
    Cast(PostVote),
    /// Same direction clicked again: the prior record is deleted.
    Retract(PostVote),
    /// Opposite direction: the prior record is rewritten in place.
    Flip { previous: PostVote, updated: PostVote },
}

impl VoteTransition {
    pub fn plan(
        existing: Option<&PostVote>,
        requested: VoteValue,
        new_vote: impl FnOnce() -> PostVote,
    ) -> Self {
        match existing {
            None => VoteTransition::Cast(new_vote()),
            Some(previous) if previous.vote_value == requested => {
                VoteTransition::Retract(previous.clone())
            }
            Some(previous) => VoteTransition::Flip {
                previous: previous.clone(),
                updated: PostVote {
                    vote_value: requested,
                    ..previous.clone()
                },
            },
        }
    }

    /// Signed change applied to `Post.voteStatus`.
    pub fn delta(&self) -> i64 {
        match self {
            VoteTransition::Cast(vote) => vote.vote_value.as_i64(),
            VoteTransition::Retract(vote) => -vote.vote_value.as_i64(),
            VoteTransition::Flip { updated, .. } => 2 * updated.vote_value.as_i64(),
        }
    }

    pub fn kind(&self) -> VoteChangeKind {
        match self {
            VoteTransition::Cast(_) => VoteChangeKind::Cast,
            VoteTransition::Retract(_) => VoteChangeKind::Retract,
            VoteTransition::Flip { .. } => VoteChangeKind::Flip,
        }
    }

    /// The user's vote after the transition, if any remains.
    pub fn resulting_vote(&self) -> Option<&PostVote> {
        match self {
            VoteTransition::Cast(vote) => Some(vote),
            VoteTransition::Retract(_) => None,
            VoteTransition::Flip { updated, .. } => Some(updated),
        }
    }

    pub fn vote_id(&self) -> &str {
        match self {
            VoteTransition::Cast(vote) | VoteTransition::Retract(vote) => &vote.id,
            VoteTransition::Flip { updated, .. } => &updated.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(value: VoteValue) -> PostVote {
        PostVote {
            id: "v1".to_string(),
            post_id: "p1".to_string(),
            community_id: "rust".to_string(),
            vote_value: value,
        }
    }

    #[test]
    fn test_cast_adds_value() {
        let up = VoteTransition::plan(None, VoteValue::Up, || vote(VoteValue::Up));
        assert_eq!(up.kind(), VoteChangeKind::Cast);
        assert_eq!(up.delta(), 1);

        let down = VoteTransition::plan(None, VoteValue::Down, || vote(VoteValue::Down));
        assert_eq!(down.delta(), -1);
    }

    #[test]
    fn test_same_direction_retracts() {
        let existing = vote(VoteValue::Down);
        let transition = VoteTransition::plan(Some(&existing), VoteValue::Down, || {
            panic!("no new vote expected")
        });
        assert_eq!(transition, VoteTransition::Retract(existing));
        assert_eq!(transition.delta(), 1);
        assert!(transition.resulting_vote().is_none());
    }

    #[test]
    fn test_opposite_direction_flips_in_place() {
        let existing = vote(VoteValue::Up);
        let transition = VoteTransition::plan(Some(&existing), VoteValue::Down, || {
            panic!("no new vote expected")
        });
        assert_eq!(transition.kind(), VoteChangeKind::Flip);
        assert_eq!(transition.delta(), -2);
        let updated = transition.resulting_vote().unwrap();
        assert_eq!(updated.id, "v1");
        assert_eq!(updated.vote_value, VoteValue::Down);
    }

    #[test]
    fn test_post_vote_wire_shape() {
        let value = serde_json::to_value(vote(VoteValue::Down)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "v1",
                "postId": "p1",
                "communityId": "rust",
                "voteValue": -1
            })
        );
    }
}
