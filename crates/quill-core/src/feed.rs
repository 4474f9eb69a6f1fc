//! Home feed filtering and personalization.
//!
//! Everything here is a pure function of the already-fetched post list and
//! the reader's current selections. Nothing fails; missing data degrades to
//! "show more", never to an error.

use std::collections::HashSet;

use crate::domain::{Post, Profile};

/// Which slice of the feed the reader has selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No category filter.
    #[default]
    All,
    /// Posts matching the reader's profile interests.
    ForYou,
    /// Posts tagged with one category id.
    Category(String),
}

impl CategoryFilter {
    /// The filter after the reader clicks `clicked`. Clicking the active
    /// filter again clears it; clicking `All` always clears.
    pub fn toggle(&self, clicked: CategoryFilter) -> CategoryFilter {
        if clicked == CategoryFilter::All || *self == clicked {
            CategoryFilter::All
        } else {
            clicked
        }
    }
}

/// Posts visible under the given selection, in input order.
pub fn compute_visible_posts<'a>(
    posts: &'a [Post],
    active: &CategoryFilter,
    profile: Option<&Profile>,
    query: &str,
) -> Vec<&'a Post> {
    let interests: Option<HashSet<&str>> = match active {
        CategoryFilter::ForYou => profile
            .filter(|p| p.has_interests())
            .map(|p| p.interests.iter().map(String::as_str).collect()),
        _ => None,
    };

    let needle = query.trim().to_lowercase();

    posts
        .iter()
        .filter(|post| match active {
            CategoryFilter::All => true,
            CategoryFilter::ForYou => match &interests {
                Some(wanted) => post.category.iter().any(|c| wanted.contains(c.as_str())),
                // No signal to personalize on: show everything.
                None => true,
            },
            CategoryFilter::Category(id) => post.in_category(id),
        })
        .filter(|post| needle.is_empty() || matches_query(post, &needle))
        .collect()
}

/// `needle` must already be trimmed and lower-cased.
fn matches_query(post: &Post, needle: &str) -> bool {
    post.searchable_text()
        .any(|text| text.to_lowercase().contains(needle))
}

/// Why a loaded feed shows nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyFeed {
    /// The store returned no posts at all.
    NoPosts,
    /// "For you" excluded everything.
    NoInterestMatches,
    /// The search or a category excluded everything.
    NoSearchMatches,
}

impl EmptyFeed {
    /// Classify an empty result. Call only when the visible list is empty.
    pub fn classify(total_posts: usize, active: &CategoryFilter) -> Self {
        if total_posts == 0 {
            EmptyFeed::NoPosts
        } else if *active == CategoryFilter::ForYou {
            EmptyFeed::NoInterestMatches
        } else {
            EmptyFeed::NoSearchMatches
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            EmptyFeed::NoPosts => "Login to read posts, or be the first to publish.",
            EmptyFeed::NoInterestMatches => {
                "No posts matched your interests yet. Try following more categories."
            }
            EmptyFeed::NoSearchMatches => "No results matched your search.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostStatus;
    use chrono::Utc;

    fn post(id: &str, title: &str, category: &[&str]) -> Post {
        Post {
            id: id.to_string(),
            title: title.to_string(),
            slug: crate::slug::slugify(title),
            content: String::new(),
            excerpt: None,
            featured_image: None,
            status: PostStatus::Active,
            author_id: "author".to_string(),
            category: category.iter().map(|c| c.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    fn profile(interests: &[&str]) -> Profile {
        Profile {
            id: "u1".to_string(),
            user_id: "u1".to_string(),
            name: "Reader".to_string(),
            email: "reader@example.com".to_string(),
            interests: interests.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn ids(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.id.clone()).collect()
    }

    fn sample() -> Vec<Post> {
        vec![
            post("1", "Untagged musings", &[]),
            post("2", "Async Rust in practice", &["tech"]),
            post("3", "Sourdough basics", &["food"]),
            post("4", "Cooking with code", &["food", "tech"]),
        ]
    }

    #[test]
    fn test_all_with_empty_query_is_identity() {
        let posts = sample();
        let visible = compute_visible_posts(&posts, &CategoryFilter::All, None, "");
        assert_eq!(ids(&visible), vec!["1", "2", "3", "4"]);

        let reader = profile(&["food"]);
        let visible = compute_visible_posts(&posts, &CategoryFilter::All, Some(&reader), "   ");
        assert_eq!(ids(&visible), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_for_you_without_signal_shows_everything() {
        let posts = sample();
        let visible = compute_visible_posts(&posts, &CategoryFilter::ForYou, None, "");
        assert_eq!(visible.len(), posts.len());

        let reader = profile(&[]);
        let visible = compute_visible_posts(&posts, &CategoryFilter::ForYou, Some(&reader), "");
        assert_eq!(visible.len(), posts.len());
    }

    #[test]
    fn test_for_you_intersects_interests() {
        let posts = sample();
        let reader = profile(&["tech", "travel"]);
        let visible = compute_visible_posts(&posts, &CategoryFilter::ForYou, Some(&reader), "");
        assert_eq!(ids(&visible), vec!["2", "4"]);
    }

    #[test]
    fn test_category_filter_is_sound_and_complete() {
        let posts = sample();
        let active = CategoryFilter::Category("food".to_string());
        let visible = compute_visible_posts(&posts, &active, None, "");

        assert!(visible.iter().all(|p| p.in_category("food")));
        let expected: Vec<String> = posts
            .iter()
            .filter(|p| p.in_category("food"))
            .map(|p| p.id.clone())
            .collect();
        assert_eq!(ids(&visible), expected);
    }

    #[test]
    fn test_untagged_post_only_matches_all() {
        let posts = vec![post("1", "Loose", &[])];
        let reader = profile(&["tech"]);
        assert_eq!(compute_visible_posts(&posts, &CategoryFilter::All, None, "").len(), 1);
        assert!(compute_visible_posts(&posts, &CategoryFilter::ForYou, Some(&reader), "").is_empty());
        assert!(
            compute_visible_posts(&posts, &CategoryFilter::Category("tech".into()), None, "")
                .is_empty()
        );
    }

    #[test]
    fn test_scenario_specific_category() {
        let posts = vec![post("1", "First", &[]), post("2", "Second", &["tech"])];
        let visible = compute_visible_posts(&posts, &CategoryFilter::Category("tech".into()), None, "");
        assert_eq!(ids(&visible), vec!["2"]);
    }

    #[test]
    fn test_scenario_query_on_title() {
        let posts = vec![
            post("1", "Alpha", &[]),
            post("2", "The foo chronicles", &[]),
            post("3", "Gamma", &[]),
        ];
        let visible = compute_visible_posts(&posts, &CategoryFilter::All, None, "foo");
        assert_eq!(ids(&visible), vec!["2"]);
    }

    #[test]
    fn test_query_is_case_insensitive_and_trimmed() {
        let posts = sample();
        let lower = compute_visible_posts(&posts, &CategoryFilter::All, None, "rust");
        let upper = compute_visible_posts(&posts, &CategoryFilter::All, None, "  RUST ");
        assert_eq!(ids(&lower), vec!["2"]);
        assert_eq!(ids(&lower), ids(&upper));
    }

    #[test]
    fn test_query_result_is_subset_of_unfiltered() {
        let posts = sample();
        let active = CategoryFilter::Category("tech".to_string());
        let all = ids(&compute_visible_posts(&posts, &active, None, ""));
        for query in ["co", "CODE", "async", "zzz", "-"] {
            let narrowed = ids(&compute_visible_posts(&posts, &active, None, query));
            assert!(narrowed.iter().all(|id| all.contains(id)), "query {query}");
        }
    }

    #[test]
    fn test_query_searches_slug_excerpt_and_content() {
        let mut posts = sample();
        posts[0].excerpt = Some("A note on Gardening".to_string());
        posts[2].content = "<p>Flour, water, salt</p>".to_string();

        let by_excerpt = compute_visible_posts(&posts, &CategoryFilter::All, None, "gardening");
        assert_eq!(ids(&by_excerpt), vec!["1"]);

        let by_content = compute_visible_posts(&posts, &CategoryFilter::All, None, "WATER");
        assert_eq!(ids(&by_content), vec!["3"]);

        let by_slug = compute_visible_posts(&posts, &CategoryFilter::All, None, "with-code");
        assert_eq!(ids(&by_slug), vec!["4"]);
    }

    #[test]
    fn test_toggle_semantics() {
        let tech = CategoryFilter::Category("tech".to_string());
        assert_eq!(CategoryFilter::All.toggle(tech.clone()), tech);
        assert_eq!(tech.toggle(tech.clone()), CategoryFilter::All);
        assert_eq!(tech.toggle(CategoryFilter::ForYou), CategoryFilter::ForYou);
        assert_eq!(CategoryFilter::ForYou.toggle(CategoryFilter::ForYou), CategoryFilter::All);
        assert_eq!(CategoryFilter::ForYou.toggle(CategoryFilter::All), CategoryFilter::All);
        assert_eq!(CategoryFilter::All.toggle(CategoryFilter::All), CategoryFilter::All);
    }

    #[test]
    fn test_empty_state_classification() {
        assert_eq!(EmptyFeed::classify(0, &CategoryFilter::ForYou), EmptyFeed::NoPosts);
        assert_eq!(
            EmptyFeed::classify(3, &CategoryFilter::ForYou),
            EmptyFeed::NoInterestMatches
        );
        assert_eq!(EmptyFeed::classify(3, &CategoryFilter::All), EmptyFeed::NoSearchMatches);
        assert_eq!(
            EmptyFeed::classify(3, &CategoryFilter::Category("tech".into())),
            EmptyFeed::NoSearchMatches
        );
    }
}
