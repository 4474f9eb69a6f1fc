//! Comment thread under a post.
//!
//! The thread loads the existing comments, then follows the comments channel
//! until the view goes away. All three sources of change (the listing, the
//! realtime feed, the reader's own actions) go through one
//! `CommentReconciler` behind a mutex.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use quill_core::BlogService;
use quill_core::comments::CommentReconciler;
use quill_core::domain::{Comment, CommentFields, User};
use quill_core::form::comment_body;
use quill_core::ports::Subscription;
use quill_shared::Notice;

use crate::error::{AppError, AppResult};
use crate::scope::ViewScope;
use crate::state::AppState;

pub const COMMENTS_UNAVAILABLE: &str = "Comments unavailable";

pub struct CommentThread {
    blog: BlogService,
    article_id: Option<String>,
    reconciler: Arc<Mutex<CommentReconciler>>,
    viewer: Option<User>,
    scope: ViewScope,
    listener: Option<JoinHandle<()>>,
}

impl CommentThread {
    /// Load and start following the comments of `article_id`. The thread
    /// lives until `teardown`, or until `parent` is cancelled.
    pub async fn mount(state: &AppState, article_id: Option<&str>, parent: &ViewScope) -> Self {
        let article_id = article_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        let mut thread = Self {
            blog: state.blog.clone(),
            reconciler: Arc::new(Mutex::new(CommentReconciler::new(
                article_id.clone().unwrap_or_default(),
            ))),
            article_id,
            viewer: None,
            scope: parent.child(),
            listener: None,
        };

        let Some(article_id) = thread.article_id.clone() else {
            tracing::warn!("Comment thread mounted without an article id");
            return thread;
        };

        thread.reconciler.lock().await.begin_loading();

        let loaded = thread
            .scope
            .guard(async {
                tokio::join!(
                    state.auth.current_user(),
                    thread.blog.list_comments(&article_id)
                )
            })
            .await;
        let Some((viewer, listing)) = loaded else {
            return thread;
        };
        thread.viewer = viewer;

        match listing {
            Ok(comments) => {
                thread.reconciler.lock().await.initialize(comments);
            }
            Err(e) => {
                tracing::warn!(article_id = %article_id, error = %e, "Failed to load comments");
                thread.reconciler.lock().await.fail_load();
            }
        }

        let mut subscription = match thread.blog.subscribe_to_comments(&article_id).await {
            Ok(subscription) => subscription,
            Err(e) => {
                tracing::warn!(
                    article_id = %article_id,
                    error = %e,
                    "Realtime unavailable, comments will not update live"
                );
                return thread;
            }
        };

        if !thread.scope.is_live() {
            subscription.close();
            return thread;
        }

        thread.listener = Some(spawn_listener(
            thread.scope.clone(),
            thread.reconciler.clone(),
            subscription,
        ));
        thread
    }

    /// False when there was no post to attach comments to.
    pub fn is_available(&self) -> bool {
        self.article_id.is_some()
    }

    /// Whether realtime updates are flowing.
    pub fn is_live(&self) -> bool {
        self.listener.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn viewer(&self) -> Option<&User> {
        self.viewer.as_ref()
    }

    pub async fn is_loading(&self) -> bool {
        self.is_available() && self.reconciler.lock().await.is_loading()
    }

    pub async fn load_failed(&self) -> bool {
        self.reconciler.lock().await.load_failed()
    }

    /// Current comments, newest first.
    pub async fn comments(&self) -> Vec<Comment> {
        self.reconciler.lock().await.comments().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.reconciler.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reconciler.lock().await.is_empty()
    }

    /// What to show instead of (or above) the list.
    pub async fn notice(&self) -> Option<Notice> {
        if !self.is_available() {
            return Some(Notice::banner(COMMENTS_UNAVAILABLE));
        }
        if self.load_failed().await {
            return Some(Notice::banner("Could not load comments."));
        }
        None
    }

    pub async fn submit(&self, content: &str) -> AppResult<Comment> {
        let article_id = self.require_article()?;
        let viewer = self.require_viewer()?;
        let body = comment_body(content)?;

        let created = self
            .blog
            .create_comment(CommentFields::new(article_id, viewer.id.as_str(), body))
            .await?;
        let outcome = self
            .reconciler
            .lock()
            .await
            .apply_local_submit(created.clone());
        tracing::debug!(comment_id = %created.id, ?outcome, "Comment submitted");
        Ok(created)
    }

    /// Replace a comment's text. `Ok(None)` when the trimmed text is empty
    /// or unchanged and nothing was sent.
    pub async fn edit(&self, comment_id: &str, content: &str) -> AppResult<Option<Comment>> {
        let existing = self.owned_comment(comment_id).await?;

        let body = content.trim();
        if body.is_empty() || body == existing.content {
            return Ok(None);
        }

        let updated = self.blog.update_comment(comment_id, body).await?;
        self.reconciler
            .lock()
            .await
            .apply_local_update(updated.clone());
        Ok(Some(updated))
    }

    pub async fn delete(&self, comment_id: &str) -> AppResult<()> {
        self.owned_comment(comment_id).await?;
        self.blog.delete_comment(comment_id).await?;
        self.reconciler.lock().await.apply_local_delete(comment_id);
        Ok(())
    }

    /// Stop following the channel and freeze the list.
    pub async fn teardown(&mut self) {
        self.scope.cancel();
        self.reconciler.lock().await.teardown();
        if let Some(listener) = self.listener.take() {
            if let Err(e) = listener.await {
                tracing::warn!(error = %e, "Comment listener ended abnormally");
            }
        }
        tracing::info!(article_id = ?self.article_id, "Comment thread torn down");
    }

    fn require_article(&self) -> AppResult<&str> {
        self.article_id
            .as_deref()
            .ok_or_else(|| AppError::NotFound(COMMENTS_UNAVAILABLE.to_string()))
    }

    fn require_viewer(&self) -> AppResult<&User> {
        self.viewer.as_ref().ok_or(AppError::Unauthorized)
    }

    async fn owned_comment(&self, comment_id: &str) -> AppResult<Comment> {
        let viewer = self.require_viewer()?;
        let comment = self
            .reconciler
            .lock()
            .await
            .get(comment_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("comment {comment_id} not found")))?;
        if !comment.is_authored_by(&viewer.id) {
            return Err(AppError::Forbidden);
        }
        Ok(comment)
    }
}

impl Drop for CommentThread {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

fn spawn_listener(
    scope: ViewScope,
    reconciler: Arc<Mutex<CommentReconciler>>,
    mut subscription: Subscription,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(channel = %subscription.channel(), "Listening for comment changes");
        loop {
            let event = tokio::select! {
                biased;
                _ = scope.cancelled() => break,
                event = subscription.next() => event,
            };
            let Some(event) = event else {
                tracing::info!(channel = %subscription.channel(), "Comment stream ended");
                break;
            };

            let comment: Comment = match event.document.decode() {
                Ok(comment) => comment,
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring malformed comment event");
                    continue;
                }
            };
            reconciler
                .lock()
                .await
                .apply_remote_event(event.kind, comment);
        }
        subscription.close();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{app, comments_channel, eventually, publish, sign_in, signed_in};
    use quill_shared::NoticeKind;

    #[tokio::test]
    async fn test_missing_article_never_subscribes() {
        let (state, store) = app();
        signed_in(&state, "Ann").await;

        let thread = CommentThread::mount(&state, Some("  "), &ViewScope::new()).await;
        assert!(!thread.is_available());
        assert!(!thread.is_live());
        assert_eq!(
            thread.notice().await.unwrap().detail.as_deref(),
            Some(COMMENTS_UNAVAILABLE)
        );
        assert_eq!(store.subscriber_count(&comments_channel(&state)).await, 0);
        assert!(matches!(
            thread.submit("hello").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_loads_existing_comments() {
        let (state, _) = app();
        let ann = signed_in(&state, "Ann").await;
        let post = publish(&state, "hello-world", &ann.id, &["tech"]).await;
        state
            .blog
            .create_comment(CommentFields::new(&post.id, ann.id.as_str(), "first"))
            .await
            .unwrap();

        let mut thread = CommentThread::mount(&state, Some(&post.id), &ViewScope::new()).await;
        assert!(!thread.is_loading().await);
        assert_eq!(thread.len().await, 1);
        assert!(thread.notice().await.is_none());
        thread.teardown().await;
    }

    #[tokio::test]
    async fn test_remote_comment_arrives_live() {
        let (state, _) = app();
        let ann = signed_in(&state, "Ann").await;
        let post = publish(&state, "hello-world", &ann.id, &["tech"]).await;
        let other = publish(&state, "other-post", &ann.id, &["tech"]).await;

        let mut thread = CommentThread::mount(&state, Some(&post.id), &ViewScope::new()).await;
        assert!(thread.is_live());

        // Someone else comments, on this post and on another one.
        state
            .blog
            .create_comment(CommentFields::new(&other.id, "bob", "elsewhere"))
            .await
            .unwrap();
        state
            .blog
            .create_comment(CommentFields::new(&post.id, "bob", "nice post"))
            .await
            .unwrap();

        let view = &thread;
        eventually(|| async move { view.len().await == 1 }).await;
        assert_eq!(thread.comments().await[0].content, "nice post");
        thread.teardown().await;
    }

    #[tokio::test]
    async fn test_own_submit_is_not_duplicated_by_echo() {
        let (state, _) = app();
        let ann = signed_in(&state, "Ann").await;
        let post = publish(&state, "hello-world", &ann.id, &["tech"]).await;
        let mut thread = CommentThread::mount(&state, Some(&post.id), &ViewScope::new()).await;

        let mine = thread.submit("  great read  ").await.unwrap();
        assert_eq!(mine.content, "great read");
        assert_eq!(thread.len().await, 1);

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(thread.len().await, 1);

        let edited = thread.edit(&mine.id, "great read!").await.unwrap().unwrap();
        assert!(edited.edited);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let comments = thread.comments().await;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, "great read!");
        thread.teardown().await;
    }

    #[tokio::test]
    async fn test_blank_comment_is_rejected() {
        let (state, _) = app();
        let ann = signed_in(&state, "Ann").await;
        let post = publish(&state, "hello-world", &ann.id, &["tech"]).await;
        let mut thread = CommentThread::mount(&state, Some(&post.id), &ViewScope::new()).await;

        let err = thread.submit("   ").await.unwrap_err();
        let notice = err.notice();
        assert_eq!(notice.kind, NoticeKind::Inline);
        assert_eq!(notice.messages, vec!["Please type a comment."]);
        thread.teardown().await;
    }

    #[tokio::test]
    async fn test_signed_out_reader_cannot_comment() {
        let (state, _) = app();
        let ann = signed_in(&state, "Ann").await;
        let post = publish(&state, "hello-world", &ann.id, &["tech"]).await;
        state.auth.logout().await.unwrap();

        let mut thread = CommentThread::mount(&state, Some(&post.id), &ViewScope::new()).await;
        assert!(thread.viewer().is_none());
        assert!(matches!(
            thread.submit("hi").await,
            Err(AppError::Unauthorized)
        ));
        thread.teardown().await;
    }

    #[tokio::test]
    async fn test_edit_and_delete_are_author_only() {
        let (state, _) = app();
        let ann = signed_in(&state, "Ann").await;
        let post = publish(&state, "hello-world", &ann.id, &["tech"]).await;
        let mut anns = CommentThread::mount(&state, Some(&post.id), &ViewScope::new()).await;
        let comment = anns.submit("mine").await.unwrap();

        assert_eq!(anns.edit(&comment.id, " mine ").await.unwrap(), None);
        assert_eq!(anns.edit(&comment.id, "").await.unwrap(), None);
        anns.teardown().await;

        signed_in(&state, "Bob").await;
        let mut bobs = CommentThread::mount(&state, Some(&post.id), &ViewScope::new()).await;
        assert!(matches!(
            bobs.edit(&comment.id, "hijacked").await,
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            bobs.delete(&comment.id).await,
            Err(AppError::Forbidden)
        ));
        bobs.teardown().await;

        sign_in(&state, "Ann").await;
        let mut anns = CommentThread::mount(&state, Some(&post.id), &ViewScope::new()).await;
        anns.delete(&comment.id).await.unwrap();
        assert!(anns.is_empty().await);
        anns.teardown().await;
    }

    #[tokio::test]
    async fn test_teardown_releases_subscription() {
        let (state, store) = app();
        let ann = signed_in(&state, "Ann").await;
        let post = publish(&state, "hello-world", &ann.id, &["tech"]).await;
        let channel = comments_channel(&state);

        let mut thread = CommentThread::mount(&state, Some(&post.id), &ViewScope::new()).await;
        assert_eq!(store.subscriber_count(&channel).await, 1);

        thread.teardown().await;
        assert!(!thread.is_live());
        assert_eq!(store.subscriber_count(&channel).await, 0);

        // Nothing lands in a torn-down thread.
        state
            .blog
            .create_comment(CommentFields::new(&post.id, "bob", "too late"))
            .await
            .unwrap();
        tokio::task::yield_now().await;
        assert!(thread.is_empty().await);
    }

    #[tokio::test]
    async fn test_parent_cancel_stops_listener() {
        let (state, store) = app();
        let ann = signed_in(&state, "Ann").await;
        let post = publish(&state, "hello-world", &ann.id, &["tech"]).await;
        let channel = comments_channel(&state);

        let page = ViewScope::new();
        let thread = CommentThread::mount(&state, Some(&post.id), &page).await;
        assert_eq!(store.subscriber_count(&channel).await, 1);
        page.cancel();

        let (store, channel, view) = (&store, &channel, &thread);
        eventually(|| async move { store.subscriber_count(channel).await == 0 }).await;
        eventually(|| async move { !view.is_live() }).await;
    }

    #[tokio::test]
    async fn test_realtime_outage_degrades_to_static_list() {
        let (state, store) = app();
        let ann = signed_in(&state, "Ann").await;
        let post = publish(&state, "hello-world", &ann.id, &["tech"]).await;
        store.set_realtime_enabled(false);

        let mut thread = CommentThread::mount(&state, Some(&post.id), &ViewScope::new()).await;
        assert!(!thread.is_live());
        assert!(!thread.load_failed().await);

        thread.submit("still works").await.unwrap();
        assert_eq!(thread.len().await, 1);
        thread.teardown().await;
    }

    #[tokio::test]
    async fn test_failed_load_is_reported() {
        let (state, store) = app();
        let ann = signed_in(&state, "Ann").await;
        let post = publish(&state, "hello-world", &ann.id, &["tech"]).await;
        store.set_offline(true);

        let mut thread = CommentThread::mount(&state, Some(&post.id), &ViewScope::new()).await;
        assert!(thread.load_failed().await);
        assert!(!thread.is_loading().await);
        assert!(!thread.is_live());
        assert_eq!(thread.notice().await.unwrap().kind, NoticeKind::Banner);
        thread.teardown().await;
    }
}
