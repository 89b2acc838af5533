use super::Community;
use serde::{Deserialize, Serialize};

/// Per-user membership marker stored at `users/{uid}/communitySnippets/{communityId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunitySnippet {
    pub community_id: String,
    #[serde(default, rename = "imageURL")]
    pub image_url: String,
}

impl CommunitySnippet {
    pub fn new(community_id: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            community_id: community_id.into(),
            image_url: image_url.into(),
        }
    }

    pub fn for_community(community: &Community) -> Self {
        Self::new(
            community.id.clone(),
            community.image_url.clone().unwrap_or_default(),
        )
    }
}
