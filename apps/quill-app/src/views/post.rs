//! Single post page.

use std::fmt;

use quill_core::domain::{Post, User};
use quill_core::{BlogService, DomainError};

use crate::error::{AppError, AppResult};
use crate::routes::Route;
use crate::scope::ViewScope;
use crate::state::AppState;
use crate::views::{CommentThread, Opened};

pub struct PostView {
    blog: BlogService,
    post: Post,
    viewer: Option<User>,
    image_url: Option<String>,
    comments: CommentThread,
    scope: ViewScope,
}

impl fmt::Debug for PostView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostView")
            .field("post_id", &self.post.id)
            .field("viewer", &self.viewer.as_ref().map(|u| &u.id))
            .field("image_url", &self.image_url)
            .field("live", &self.scope.is_live())
            .finish()
    }
}

impl PostView {
    /// Open `/post/:slug`. A blank slug or a missing post sends the reader
    /// home. Nothing is shown if `parent` is cancelled before the post loads.
    pub async fn open(state: &AppState, slug: &str, parent: &ViewScope) -> AppResult<Opened<Self>> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Ok(Opened::Redirect(Route::Home));
        }

        let scope = parent.child();
        let Some((post, viewer)) = scope
            .guard(async { tokio::join!(state.blog.get_post(slug), state.auth.current_user()) })
            .await
        else {
            tracing::debug!(slug = %slug, "Post page closed before loading finished");
            return Ok(Opened::Closed);
        };
        let post = match post {
            Ok(post) => post,
            Err(DomainError::NotFound { .. }) => {
                tracing::debug!(slug = %slug, "Post not found, redirecting home");
                return Ok(Opened::Redirect(Route::Home));
            }
            Err(e) => return Err(e.into()),
        };

        let comments = CommentThread::mount(state, Some(&post.id), &scope).await;
        let image_url = state.blog.file_preview(post.featured_image.as_ref());

        Ok(Opened::Show(Self {
            blog: state.blog.clone(),
            post,
            viewer,
            image_url,
            comments,
            scope,
        }))
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn is_author(&self) -> bool {
        self.viewer
            .as_ref()
            .is_some_and(|viewer| self.post.is_authored_by(&viewer.id))
    }

    pub fn reading_time(&self) -> u32 {
        self.post.reading_time_minutes()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Where the edit button leads, for the author only.
    pub fn edit_route(&self) -> Option<Route> {
        self.is_author()
            .then(|| Route::EditPost(self.post.id.clone()))
    }

    pub fn comments(&self) -> &CommentThread {
        &self.comments
    }

    /// Delete the post, then its featured image. Returns where to go next.
    pub async fn delete(&mut self) -> AppResult<Route> {
        if !self.is_author() {
            return Err(AppError::Forbidden);
        }

        self.blog.delete_post(&self.post.id).await?;
        tracing::info!(post_id = %self.post.id, "Post deleted");

        if let Some(image) = &self.post.featured_image {
            if let Err(e) = self.blog.delete_file(image).await {
                tracing::warn!(file_id = %image.id(), error = %e, "Failed to delete featured image");
            }
        }

        self.teardown().await;
        Ok(Route::Home)
    }

    pub async fn teardown(&mut self) {
        self.comments.teardown().await;
        self.scope.cancel();
    }
}
