//! Fixtures shared by the view tests.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use quill_core::domain::{Post, PostFields, PostStatus, User};
use quill_core::ports::{Credentials, NewAccount};
use quill_infra::InMemoryDocumentStore;

use crate::config::AppConfig;
use crate::state::AppState;

pub fn app() -> (AppState, Arc<InMemoryDocumentStore>) {
    AppState::in_memory(&AppConfig::default())
}

/// Register an account and sign it in.
pub async fn signed_in(state: &AppState, name: &str) -> User {
    let account = NewAccount {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        password: "Secret123!".to_string(),
    };
    let user = state.auth.create_account(&account).await.unwrap();
    state.auth.login(&account.credentials()).await.unwrap();
    user
}

pub async fn sign_in(state: &AppState, name: &str) {
    let credentials = Credentials {
        email: format!("{}@example.com", name.to_lowercase()),
        password: "Secret123!".to_string(),
    };
    state.auth.login(&credentials).await.unwrap();
}

pub async fn publish(state: &AppState, slug: &str, author_id: &str, category: &[&str]) -> Post {
    state
        .blog
        .create_post(PostFields {
            title: slug.replace('-', " "),
            slug: slug.to_string(),
            content: "<p>Some words worth reading.</p>".to_string(),
            featured_image: None,
            status: PostStatus::Active,
            author_id: author_id.to_string(),
            category: category.iter().map(|c| c.to_string()).collect(),
        })
        .await
        .unwrap()
}

pub fn comments_channel(state: &AppState) -> String {
    let collections = state.blog.collections();
    collections.channel(&collections.comments)
}

/// Poll `check` until it holds, failing the test after about a second.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}
