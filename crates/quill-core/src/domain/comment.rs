use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity - attached to a post through `article_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub article_id: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub content: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub user_id: String,
    /// Reserved for threading; not used for nesting yet.
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub edited: bool,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        !self.user_id.is_empty() && self.user_id == user_id
    }
}

/// Fields written when a comment is created.
#[derive(Debug, Clone, Serialize)]
pub struct CommentFields {
    pub article_id: String,
    pub content: String,
    pub user_id: String,
    pub parent_id: Option<String>,
    pub edited: bool,
}

impl CommentFields {
    pub fn new(article_id: impl Into<String>, user_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            article_id: article_id.into(),
            content: content.into(),
            user_id: user_id.into(),
            parent_id: None,
            edited: false,
        }
    }
}
