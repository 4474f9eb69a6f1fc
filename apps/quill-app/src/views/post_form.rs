//! Create and edit forms for posts.

use quill_core::domain::{FileRef, Post, User};
use quill_core::form::{FormMode, PostDraft};
use quill_core::{BlogService, DomainError};

use crate::error::{AppError, AppResult};
use crate::routes::Route;
use crate::state::AppState;
use crate::views::Opened;

pub struct PostFormView {
    blog: BlogService,
    author: User,
    mode: FormMode,
    original: Option<Post>,
    draft: PostDraft,
}

impl PostFormView {
    /// Blank form for `/add-post`.
    pub async fn create(state: &AppState) -> AppResult<Self> {
        let author = state
            .auth
            .current_user()
            .await
            .ok_or(AppError::Unauthorized)?;
        Ok(Self {
            blog: state.blog.clone(),
            author,
            mode: FormMode::Create,
            original: None,
            draft: PostDraft::default(),
        })
    }

    /// Prefilled form for `/edit-post/:slug`. Only the author gets the form;
    /// anyone else is sent to the post itself.
    pub async fn edit(state: &AppState, slug: &str) -> AppResult<Opened<Self>> {
        let author = state
            .auth
            .current_user()
            .await
            .ok_or(AppError::Unauthorized)?;

        let post = match state.blog.get_post(slug).await {
            Ok(post) => post,
            Err(DomainError::NotFound { .. }) => return Ok(Opened::Redirect(Route::Home)),
            Err(e) => return Err(e.into()),
        };
        if !post.is_authored_by(&author.id) {
            tracing::debug!(post_id = %post.id, user_id = %author.id, "Edit refused for non-author");
            return Ok(Opened::Redirect(Route::Post(post.id)));
        }

        Ok(Opened::Show(Self {
            blog: state.blog.clone(),
            author,
            mode: FormMode::Edit,
            draft: PostDraft::from_post(&post),
            original: Some(post),
        }))
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn draft(&self) -> &PostDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut PostDraft {
        &mut self.draft
    }

    /// Validate and save. Nothing reaches the backend if validation fails.
    pub async fn submit(&mut self) -> AppResult<Post> {
        self.draft.validate(self.mode)?;
        match self.original.clone() {
            None => self.submit_new().await,
            Some(original) => self.submit_edit(original).await,
        }
    }

    async fn submit_new(&mut self) -> AppResult<Post> {
        let image = self
            .draft
            .image
            .take()
            .ok_or_else(|| AppError::Validation(vec!["Please add a featured image.".to_string()]))?;
        let file = self.blog.upload_file(&image.name, image.bytes).await?;

        let fields = self.draft.clone().into_fields(&self.author.id, file.clone());
        match self.blog.create_post(fields).await {
            Ok(post) => {
                tracing::info!(post_id = %post.id, "Post created");
                Ok(post)
            }
            Err(e) => {
                self.discard_upload(&file).await;
                Err(e.into())
            }
        }
    }

    async fn submit_edit(&mut self, original: Post) -> AppResult<Post> {
        let replacement = match self.draft.image.take() {
            Some(image) => Some(self.blog.upload_file(&image.name, image.bytes).await?),
            None => None,
        };

        let patch = self.draft.clone().into_patch(replacement.clone());
        let post = match self.blog.update_post(&original.id, patch).await {
            Ok(post) => post,
            Err(e) => {
                if let Some(file) = &replacement {
                    self.discard_upload(file).await;
                }
                return Err(e.into());
            }
        };

        if let (Some(_), Some(previous)) = (&replacement, &original.featured_image) {
            if let Err(e) = self.blog.delete_file(previous).await {
                tracing::warn!(file_id = %previous.id(), error = %e, "Failed to delete replaced image");
            }
        }

        tracing::info!(post_id = %post.id, "Post updated");
        self.draft.slug = post.slug.clone();
        self.original = Some(post.clone());
        Ok(post)
    }

    async fn discard_upload(&self, file: &FileRef) {
        if let Err(e) = self.blog.delete_file(file).await {
            tracing::warn!(file_id = %file.id(), error = %e, "Failed to discard uploaded image");
        }
    }
}
