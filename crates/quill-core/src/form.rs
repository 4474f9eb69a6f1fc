//! Form state and local validation. Nothing here talks to the backend;
//! failures are reported as `ValidationErrors` before any request is made.

use crate::domain::{FileRef, Post, PostFields, PostPatch, PostStatus};
use crate::error::{DomainError, ValidationErrors};
use crate::slug::slugify;

pub const MIN_PASSWORD_LEN: usize = 8;

/// A new image picked in the form, not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    const ACCEPTED: [&'static str; 4] = ["png", "jpg", "jpeg", "gif"];

    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn is_accepted_type(&self) -> bool {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| Self::ACCEPTED.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// Editable state of the post form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub status: PostStatus,
    pub category: Vec<String>,
    pub image: Option<ImageUpload>,
}

impl PostDraft {
    /// Prefill from an existing post for editing.
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.slug.clone(),
            content: post.content.clone(),
            status: post.status,
            category: post.category.clone(),
            image: None,
        }
    }

    /// Set the title and regenerate the slug from it.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.slug = slugify(&self.title);
    }

    /// Hand-edited slugs are normalized the same way generated ones are.
    pub fn set_slug(&mut self, slug: &str) {
        self.slug = slugify(slug);
    }

    /// Select the category if unselected, unselect it otherwise.
    pub fn toggle_category(&mut self, category_id: &str) {
        if let Some(pos) = self.category.iter().position(|c| c == category_id) {
            self.category.remove(pos);
        } else {
            self.category.push(category_id.to_string());
        }
    }

    pub fn validate(&self, mode: FormMode) -> Result<(), DomainError> {
        let mut errors = ValidationErrors::new();

        if self.title.trim().is_empty() {
            errors.push("Title is required");
        }
        if self.slug.is_empty() {
            errors.push("Slug is required");
        }
        if self.content.trim().is_empty() {
            errors.push("Content is required");
        }
        if self.category.is_empty() {
            errors.push("Please choose at least one category for this post.");
        }
        match &self.image {
            Some(image) if !image.is_accepted_type() => {
                errors.push("Featured image must be a PNG, JPG, JPEG or GIF file.");
            }
            None if mode == FormMode::Create => errors.push("Please add a featured image."),
            _ => {}
        }

        errors.into_result()
    }

    pub fn into_fields(self, author_id: &str, featured_image: FileRef) -> PostFields {
        PostFields {
            title: self.title,
            slug: self.slug,
            content: self.content,
            featured_image: Some(featured_image),
            status: self.status,
            author_id: author_id.to_string(),
            category: self.category,
        }
    }

    /// Patch for an edit. The slug the post was created with is kept even
    /// if the title changed. `featured_image` is only set when a replacement
    /// was uploaded.
    pub fn into_patch(self, featured_image: Option<FileRef>) -> PostPatch {
        PostPatch {
            title: Some(self.title),
            content: Some(self.content),
            featured_image,
            status: Some(self.status),
            category: Some(self.category),
        }
    }
}

/// Score a password from 0 to 5: length, upper, lower, digit, symbol.
pub fn password_strength(password: &str) -> u8 {
    [
        password.chars().count() >= MIN_PASSWORD_LEN,
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| "@$!%*?&".contains(c)),
    ]
    .into_iter()
    .filter(|&hit| hit)
    .count() as u8
}

/// Signup and login share these checks.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), DomainError> {
    let mut errors = ValidationErrors::new();
    if email.trim().is_empty() || !email.contains('@') {
        errors.push("Invalid email address");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    errors.into_result()
}

/// Trimmed comment body, or a validation error when blank.
pub fn comment_body(content: &str) -> Result<String, DomainError> {
    let body = content.trim();
    if body.is_empty() {
        return Err(DomainError::invalid("Please type a comment."));
    }
    Ok(body.to_string())
}
