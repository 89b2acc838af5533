use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyType {
    #[default]
    Public,
    Restricted,
    Private,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: String,
    #[serde(default)]
    pub creator_id: Option<String>,
    #[serde(default, rename = "imageURL")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub number_of_members: i64,
    #[serde(default)]
    pub privacy_type: PrivacyType,
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl Community {
    pub fn new(id: impl Into<String>, creator_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            creator_id: Some(creator_id.into()),
            image_url: None,
            number_of_members: 1,
            privacy_type: PrivacyType::Public,
            created_at: Some(chrono::Utc::now().timestamp_millis()),
        }
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn with_members(mut self, number_of_members: i64) -> Self {
        self.number_of_members = number_of_members;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let community = Community::new("rust", "u1")
            .with_image_url("https://img/rust.png")
            .with_members(3);
        let value = serde_json::to_value(&community).unwrap();
        assert_eq!(value["imageURL"], "https://img/rust.png");
        assert_eq!(value["numberOfMembers"], 3);
        assert_eq!(value["privacyType"], "public");
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let parsed: Community =
            serde_json::from_value(serde_json::json!({ "id": "rust" })).unwrap();
        assert_eq!(parsed.number_of_members, 0);
        assert!(parsed.image_url.is_none());
    }
}
