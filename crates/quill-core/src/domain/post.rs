use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque reference to a file held by the file storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileRef(String);

impl FileRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Active,
    Inactive,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Active => "active",
            PostStatus::Inactive => "inactive",
        }
    }
}

/// Post entity - a blog article. The document id is the slug it was
/// created with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub slug: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub featured_image: Option<FileRef>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub status: PostStatus,
    #[serde(default, deserialize_with = "super::nullable")]
    pub author_id: String,
    /// Category ids. Membership is what matters; order is whatever the
    /// author picked them in.
    #[serde(default, deserialize_with = "super::id_list")]
    pub category: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        !self.author_id.is_empty() && self.author_id == user_id
    }

    pub fn in_category(&self, category_id: &str) -> bool {
        self.category.iter().any(|c| c == category_id)
    }

    /// Text fields searched by the feed, empty ones skipped.
    pub fn searchable_text(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.title.as_str()),
            Some(self.slug.as_str()),
            self.excerpt.as_deref(),
            Some(self.content.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
    }

    /// Estimated minutes to read the content at 200 words per minute.
    pub fn reading_time_minutes(&self) -> u32 {
        let words = strip_tags(&self.content).split_whitespace().count();
        if words == 0 {
            return 0;
        }
        ((words as f64 / 200.0).round() as u32).max(1)
    }
}

/// Replace every `<...>` tag with a space.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Fields written when a post is created.
#[derive(Debug, Clone, Serialize)]
pub struct PostFields {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub featured_image: Option<FileRef>,
    pub status: PostStatus,
    pub author_id: String,
    pub category: Vec<String>,
}

/// Partial update of a post. Absent fields are left untouched. The slug is
/// fixed at creation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<FileRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<String>>,
}
