//! Home feed and the all-posts listing.

use quill_core::BlogService;
use quill_core::domain::{Category, Post, Profile, User};
use quill_core::feed::{CategoryFilter, EmptyFeed, compute_visible_posts};
use quill_shared::Notice;
use quill_shared::dto::PostCard;

use crate::error::AppError;
use crate::scope::ViewScope;
use crate::state::AppState;

/// Which posts the feed is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource {
    /// Active posts only, for the home page.
    Published,
    /// Every post regardless of status.
    Everything,
}

/// Everything the feed was built from.
#[derive(Debug, Clone, Default)]
pub struct FeedData {
    pub posts: Vec<Post>,
    pub categories: Vec<Category>,
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone)]
pub enum FeedState {
    Loading,
    Ready(FeedData),
    /// The post listing failed. Distinct from an empty feed.
    Failed(Notice),
}

pub struct FeedView {
    scope: ViewScope,
    state: FeedState,
    query: String,
    active: CategoryFilter,
    blog: BlogService,
}

impl FeedView {
    /// Load posts, the reader's profile and the categories together. The
    /// view stays `Loading` until all of them are in.
    pub async fn load(state: &AppState, source: FeedSource, parent: &ViewScope) -> Self {
        let mut view = Self {
            scope: parent.child(),
            state: FeedState::Loading,
            query: String::new(),
            active: CategoryFilter::All,
            blog: state.blog.clone(),
        };

        let blog = &view.blog;
        let posts_and_profile = async {
            let viewer = state.auth.current_user().await;
            let posts = match source {
                FeedSource::Published => blog.list_active_posts().await,
                FeedSource::Everything => blog.list_posts(&[]).await,
            };
            (posts, load_profile(blog, viewer.as_ref()).await)
        };

        let Some(((posts, profile), categories)) = view
            .scope
            .guard(async { tokio::join!(posts_and_profile, blog.list_categories()) })
            .await
        else {
            tracing::debug!("Feed closed before loading finished");
            return view;
        };

        let categories = categories.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load categories");
            Vec::new()
        });

        view.state = match posts {
            Ok(posts) => {
                tracing::debug!(
                    posts = posts.len(),
                    categories = categories.len(),
                    personalized = profile.as_ref().is_some_and(Profile::has_interests),
                    "Feed loaded"
                );
                FeedState::Ready(FeedData {
                    posts,
                    categories,
                    profile,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load posts");
                FeedState::Failed(AppError::from(e).notice())
            }
        };
        view
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, FeedState::Loading)
    }

    pub fn error(&self) -> Option<&Notice> {
        match &self.state {
            FeedState::Failed(notice) => Some(notice),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&FeedData> {
        match &self.state {
            FeedState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn categories(&self) -> &[Category] {
        self.data().map(|d| d.categories.as_slice()).unwrap_or_default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn active(&self) -> &CategoryFilter {
        &self.active
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Handle a click on a category chip.
    pub fn select(&mut self, clicked: CategoryFilter) {
        self.active = self.active.toggle(clicked);
        tracing::debug!(active = ?self.active, "Feed filter changed");
    }

    pub fn visible(&self) -> Vec<&Post> {
        match self.data() {
            Some(data) => {
                compute_visible_posts(&data.posts, &self.active, data.profile.as_ref(), &self.query)
            }
            None => Vec::new(),
        }
    }

    /// Why nothing is shown, once loaded.
    pub fn empty_state(&self) -> Option<EmptyFeed> {
        let data = self.data()?;
        if !self.visible().is_empty() {
            return None;
        }
        Some(EmptyFeed::classify(data.posts.len(), &self.active))
    }

    pub fn cards(&self) -> Vec<PostCard> {
        self.visible()
            .into_iter()
            .map(|post| PostCard::from_post(post, self.blog.file_preview(post.featured_image.as_ref())))
            .collect()
    }

    pub fn teardown(&self) {
        self.scope.cancel();
    }
}

async fn load_profile(blog: &BlogService, viewer: Option<&User>) -> Option<Profile> {
    let viewer = viewer?;
    match blog.find_profile(&viewer.id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(user_id = %viewer.id, error = %e, "Failed to load profile");
            None
        }
    }
}
