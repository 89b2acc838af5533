use super::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const COMMUNITIES: &str = "communities";
pub const POSTS: &str = "posts";
pub const USERS: &str = "users";
pub const COMMUNITY_SNIPPETS: &str = "communitySnippets";
pub const POST_VOTES: &str = "postVotes";

fn split_segments(raw: &str) -> Result<Vec<String>, String> {
    let segments: Vec<String> = raw.trim_matches('/').split('/').map(str::to_string).collect();
    if segments.iter().any(|segment| segment.trim().is_empty()) {
        return Err(format!("Path contains an empty segment: {raw}"));
    }
    Ok(segments)
}

fn ensure_segment(segment: &str) -> Result<(), String> {
    if segment.trim().is_empty() {
        return Err("Path segment cannot be empty".to_string());
    }
    if segment.contains('/') {
        return Err(format!("Path segment cannot contain '/': {segment}"));
    }
    Ok(())
}

/// Slash separated path with an even number of segments (`posts/p1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentPath(String);

/// Slash separated path with an odd number of segments (`users/u1/postVotes`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionPath(String);

impl DocumentPath {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let segments = split_segments(raw)?;
        if segments.len() % 2 != 0 {
            return Err(format!("Document path needs an even segment count: {raw}"));
        }
        Ok(Self(segments.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parent(&self) -> CollectionPath {
        match self.0.rsplit_once('/') {
            Some((parent, _)) => CollectionPath(parent.to_string()),
            None => CollectionPath(String::new()),
        }
    }

    pub fn collection(&self, name: &str) -> Result<CollectionPath, String> {
        ensure_segment(name)?;
        Ok(CollectionPath(format!("{}/{name}", self.0)))
    }

    pub fn community(community_id: &str) -> Result<Self, String> {
        CollectionPath::root(COMMUNITIES)?.doc(community_id)
    }

    pub fn post(post_id: &str) -> Result<Self, String> {
        CollectionPath::root(POSTS)?.doc(post_id)
    }

    pub fn user(user: &UserId) -> Result<Self, String> {
        CollectionPath::root(USERS)?.doc(user.as_str())
    }

    pub fn community_snippet(user: &UserId, community_id: &str) -> Result<Self, String> {
        CollectionPath::community_snippets(user)?.doc(community_id)
    }

    pub fn post_vote(user: &UserId, vote_id: &str) -> Result<Self, String> {
        CollectionPath::post_votes(user)?.doc(vote_id)
    }
}

impl CollectionPath {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let segments = split_segments(raw)?;
        if segments.len() % 2 != 1 {
            return Err(format!("Collection path needs an odd segment count: {raw}"));
        }
        Ok(Self(segments.join("/")))
    }

    pub fn root(name: &str) -> Result<Self, String> {
        ensure_segment(name)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn doc(&self, id: &str) -> Result<DocumentPath, String> {
        ensure_segment(id)?;
        Ok(DocumentPath(format!("{}/{id}", self.0)))
    }

    pub fn community_snippets(user: &UserId) -> Result<Self, String> {
        DocumentPath::user(user)?.collection(COMMUNITY_SNIPPETS)
    }

    pub fn post_votes(user: &UserId) -> Result<Self, String> {
        DocumentPath::user(user)?.collection(POST_VOTES)
    }
}

impl TryFrom<String> for DocumentPath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<String> for CollectionPath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DocumentPath> for String {
    fn from(path: DocumentPath) -> Self {
        path.0
    }
}

impl From<CollectionPath> for String {
    fn from(path: CollectionPath) -> Self {
        path.0
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
