//! Quill - blog client.
//!
//! Wires the in-process backend into the views and walks the home feed and
//! the first post's comment thread, logging what each page would render.

mod config;
mod demo;
mod error;
mod routes;
mod scope;
mod state;
mod telemetry;
mod views;

#[cfg(test)]
mod testing;

use crate::config::AppConfig;
use crate::routes::{Navigation, Route};
use crate::scope::ViewScope;
use crate::state::AppState;
use crate::views::{FeedSource, FeedView, PostView};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_telemetry(&config.telemetry);

    tracing::info!(
        endpoint = %config.backend.endpoint,
        project = %config.backend.project_id,
        database = %config.backend.database_id,
        "Starting Quill"
    );

    let (state, store) = AppState::in_memory(&config);

    if config.seed_demo {
        let author = demo::seed(&state, store.as_ref()).await?;
        tracing::info!(user_id = %author.id, "Signed in as demo author");
    }

    let root = ViewScope::new();
    let result = walk(&state, &root).await;
    root.cancel();

    tracing::info!("Quill stopped");
    result
}

async fn walk(state: &AppState, root: &ViewScope) -> anyhow::Result<()> {
    for path in ["/", "/add-post", "/login"] {
        match routes::resolve(state, path).await {
            Navigation::Render(route) => tracing::info!(path, route = ?route, "Render"),
            Navigation::Redirect(route) => {
                tracing::info!(path, to = %route.path(), "Redirect")
            }
            Navigation::NotFound => tracing::info!(path, "Not found"),
        }
    }

    let feed = FeedView::load(state, FeedSource::Published, root).await;
    if let Some(notice) = feed.error() {
        tracing::error!(title = %notice.title, detail = ?notice.detail, "Feed unavailable");
        return Ok(());
    }
    if let Some(empty) = feed.empty_state() {
        tracing::info!(message = empty.message(), "Feed is empty");
    }
    for card in feed.cards() {
        tracing::info!(title = %card.title, link = %card.link, "Post card");
    }

    let first = feed.visible().first().map(|post| post.id.clone());
    feed.teardown();

    let Some(slug) = first else {
        return Ok(());
    };
    let Some(mut page) = PostView::open(state, &slug, root).await?.into_view() else {
        return Ok(());
    };

    tracing::info!(
        title = %page.post().title,
        reading_minutes = page.reading_time(),
        author = page.is_author(),
        edit = ?page.edit_route().map(|r: Route| r.path()),
        "Post page"
    );
    for comment in page.comments().comments().await {
        tracing::info!(id = %comment.id, content = %comment.content, "Comment");
    }

    page.teardown().await;
    Ok(())
}
