//! Data Transfer Objects - what forms submit and what lists render.

use serde::{Deserialize, Serialize};

use quill_core::domain::Post;

const CARD_TITLE_CHARS: usize = 60;
const CARD_EXCERPT_CHARS: usize = 90;

/// Login form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Signup form, including the interests picked during registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub interests: Vec<String>,
}

/// A post as shown in a feed grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCard {
    pub id: String,
    pub link: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl PostCard {
    pub fn from_post(post: &Post, image_url: Option<String>) -> Self {
        Self {
            id: post.id.clone(),
            link: format!("/post/{}", post.id),
            title: truncate(&post.title, CARD_TITLE_CHARS),
            excerpt: post
                .excerpt
                .as_deref()
                .filter(|e| !e.is_empty())
                .map(|e| truncate(e, CARD_EXCERPT_CHARS)),
            image_url,
        }
    }
}

/// Cut to `max` characters, marking the cut with an ellipsis.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quill_core::domain::PostStatus;

    fn post(title: &str, excerpt: Option<&str>) -> Post {
        Post {
            id: "p1".to_string(),
            title: title.to_string(),
            slug: "p1".to_string(),
            content: String::new(),
            excerpt: excerpt.map(str::to_string),
            featured_image: None,
            status: PostStatus::Active,
            author_id: "u1".to_string(),
            category: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_short_fields_untouched() {
        let card = PostCard::from_post(&post("Short", Some("Brief")), None);
        assert_eq!(card.title, "Short");
        assert_eq!(card.excerpt.as_deref(), Some("Brief"));
        assert_eq!(card.link, "/post/p1");
    }

    #[test]
    fn test_long_fields_truncated() {
        let title = "t".repeat(61);
        let excerpt = "é".repeat(100);
        let card = PostCard::from_post(&post(&title, Some(&excerpt)), None);
        assert_eq!(card.title.chars().count(), 61);
        assert!(card.title.ends_with('…'));
        assert_eq!(card.excerpt.unwrap().chars().count(), 91);
    }

    #[test]
    fn test_empty_excerpt_dropped() {
        let card = PostCard::from_post(&post("T", Some("")), None);
        assert!(card.excerpt.is_none());
    }
}
