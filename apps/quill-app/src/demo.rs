//! Sample content for the in-process backend.

use serde_json::json;

use quill_core::DomainError;
use quill_core::domain::{CommentFields, User};
use quill_core::form::ImageUpload;
use quill_core::ports::DocumentStore;
use quill_shared::dto::SignupRequest;

use crate::error::AppResult;
use crate::state::AppState;
use crate::views::{PostFormView, account};

const CATEGORIES: [(&str, &str); 3] = [("tech", "Tech"), ("food", "Food"), ("travel", "Travel")];

const POSTS: [(&str, &str, &[&str]); 3] = [
    (
        "Getting Started with Rust",
        "<p>Ownership, borrowing and lifetimes, one step at a time.</p>",
        &["tech"],
    ),
    (
        "A Week of Street Food",
        "<p>Seven cities, seven snacks, one very happy stomach.</p>",
        &["food", "travel"],
    ),
    (
        "Packing Light",
        "<p>Everything fits in one bag if you let it.</p>",
        &["travel"],
    ),
];

/// Seed categories, a signed-in demo author with a profile, a few posts and
/// a comment. Returns the demo author.
pub async fn seed(state: &AppState, store: &dyn DocumentStore) -> AppResult<User> {
    let categories = &state.blog.collections().categories;
    for (id, name) in CATEGORIES {
        store
            .create_document(categories, id, json!({ "category_name": name }), None)
            .await
            .map_err(DomainError::from)?;
    }

    let author = account::signup(
        state,
        SignupRequest {
            name: "Demo Author".to_string(),
            email: "demo@quill.local".to_string(),
            password: "Demo1234!".to_string(),
            interests: vec!["travel".to_string()],
        },
    )
    .await?;

    for (title, content, category) in POSTS {
        let mut form = PostFormView::create(state).await?;
        let draft = form.draft_mut();
        draft.set_title(title);
        draft.content = content.to_string();
        for id in category {
            draft.toggle_category(id);
        }
        draft.image = Some(ImageUpload::new("cover.png", vec![0x89, b'P', b'N', b'G']));
        let post = form.submit().await?;

        state
            .blog
            .create_comment(CommentFields::new(
                post.id.as_str(),
                author.id.as_str(),
                "Thanks for reading!",
            ))
            .await?;
    }

    tracing::info!(
        categories = CATEGORIES.len(),
        posts = POSTS.len(),
        "Demo content seeded"
    );
    Ok(author)
}
