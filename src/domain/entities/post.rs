use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub community_id: String,
    pub creator_id: String,
    #[serde(default)]
    pub creator_display_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub number_of_comments: i64,
    #[serde(default)]
    pub vote_status: i64,
    #[serde(default, rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: i64,
}

impl Post {
    pub fn new(
        community_id: impl Into<String>,
        creator_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            community_id: community_id.into(),
            creator_id: creator_id.into(),
            creator_display_name: String::new(),
            title: title.into(),
            body: String::new(),
            number_of_comments: 0,
            vote_status: 0,
            image_url: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_vote_status(mut self, vote_status: i64) -> Self {
        self.vote_status = vote_status;
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn apply_vote_delta(&mut self, delta: i64) {
        self.vote_status += delta;
    }

    pub fn has_image(&self) -> bool {
        self.image_url
            .as_deref()
            .map(|url| !url.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn is_created_by(&self, user_id: &str) -> bool {
        self.creator_id == user_id
    }
}
