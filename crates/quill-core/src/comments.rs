//! Comment list reconciliation.
//!
//! A comment thread is fed from three places: the initial listing, the
//! realtime change feed, and the reader's own submissions. The reconciler
//! keeps comments keyed by id and projects them newest-first, so the same
//! comment arriving twice (local submit, then its `Created` event) is merged
//! instead of duplicated.

use std::collections::{HashMap, VecDeque};

use crate::domain::Comment;
use crate::ports::ChangeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    Uninitialized,
    Loading,
    Ready,
    TornDown,
}

/// What an operation did to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    Replaced,
    Removed,
    Ignored,
}

/// View-local comment list for one post.
#[derive(Debug)]
pub struct CommentReconciler {
    article_id: String,
    state: ThreadState,
    load_failed: bool,
    entries: HashMap<String, Comment>,
    /// Ids, front is the first comment shown.
    order: VecDeque<String>,
}

impl CommentReconciler {
    pub fn new(article_id: impl Into<String>) -> Self {
        Self {
            article_id: article_id.into(),
            state: ThreadState::Uninitialized,
            load_failed: false,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn article_id(&self) -> &str {
        &self.article_id
    }

    pub fn state(&self) -> ThreadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ThreadState::Uninitialized | ThreadState::Loading)
    }

    /// The initial listing failed; the list is empty and stays usable.
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Comment> {
        self.entries.get(id)
    }

    /// Comments in display order.
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn begin_loading(&mut self) {
        if self.state == ThreadState::Uninitialized {
            self.state = ThreadState::Loading;
        }
    }

    /// Replace the list wholesale with a fresh snapshot, kept in the order
    /// given. Entries for another article and repeats of an id already taken
    /// are left out. Returns how many entries were left out.
    pub fn initialize(&mut self, snapshot: Vec<Comment>) -> usize {
        if self.state == ThreadState::TornDown {
            return snapshot.len();
        }
        self.entries.clear();
        self.order.clear();
        let mut skipped = 0;
        for comment in snapshot {
            if comment.article_id != self.article_id {
                tracing::debug!(
                    comment_id = %comment.id,
                    article_id = %comment.article_id,
                    "Snapshot entry for another article skipped"
                );
                skipped += 1;
                continue;
            }
            if self.entries.contains_key(&comment.id) {
                tracing::debug!(comment_id = %comment.id, "Duplicate snapshot entry skipped");
                skipped += 1;
                continue;
            }
            self.order.push_back(comment.id.clone());
            self.entries.insert(comment.id.clone(), comment);
        }
        self.load_failed = false;
        self.state = ThreadState::Ready;
        tracing::debug!(
            article_id = %self.article_id,
            count = self.order.len(),
            skipped,
            "Comments initialized"
        );
        skipped
    }

    pub fn fail_load(&mut self) {
        if self.state == ThreadState::TornDown {
            return;
        }
        self.entries.clear();
        self.order.clear();
        self.load_failed = true;
        self.state = ThreadState::Ready;
    }

    /// Apply a realtime change. Events for other posts, and events arriving
    /// before the thread is ready or after teardown, are ignored.
    pub fn apply_remote_event(&mut self, kind: ChangeKind, comment: Comment) -> MergeOutcome {
        if self.state != ThreadState::Ready || comment.article_id != self.article_id {
            return MergeOutcome::Ignored;
        }
        let outcome = match kind {
            ChangeKind::Created => self.upsert_front(comment),
            ChangeKind::Updated => self.replace(comment),
            ChangeKind::Deleted => self.remove(&comment.id),
        };
        tracing::debug!(article_id = %self.article_id, ?kind, ?outcome, "Remote comment event");
        outcome
    }

    /// Show a comment the reader just submitted, ahead of its realtime echo.
    pub fn apply_local_submit(&mut self, comment: Comment) -> MergeOutcome {
        if self.state != ThreadState::Ready || comment.article_id != self.article_id {
            return MergeOutcome::Ignored;
        }
        self.upsert_front(comment)
    }

    /// Apply the result of a successful local edit.
    pub fn apply_local_update(&mut self, comment: Comment) -> MergeOutcome {
        if self.state != ThreadState::Ready {
            return MergeOutcome::Ignored;
        }
        self.replace(comment)
    }

    /// Apply a successful local delete.
    pub fn apply_local_delete(&mut self, id: &str) -> MergeOutcome {
        if self.state != ThreadState::Ready {
            return MergeOutcome::Ignored;
        }
        self.remove(id)
    }

    /// Terminal. Nothing is applied afterwards.
    pub fn teardown(&mut self) {
        self.state = ThreadState::TornDown;
    }

    fn upsert_front(&mut self, comment: Comment) -> MergeOutcome {
        if let Some(existing) = self.entries.get_mut(&comment.id) {
            *existing = comment;
            return MergeOutcome::Replaced;
        }
        self.order.push_front(comment.id.clone());
        self.entries.insert(comment.id.clone(), comment);
        MergeOutcome::Inserted
    }

    fn replace(&mut self, comment: Comment) -> MergeOutcome {
        match self.entries.get_mut(&comment.id) {
            Some(existing) => {
                *existing = comment;
                MergeOutcome::Replaced
            }
            // Update seen before its create: nothing to update yet.
            None => MergeOutcome::Ignored,
        }
    }

    fn remove(&mut self, id: &str) -> MergeOutcome {
        if self.entries.remove(id).is_none() {
            return MergeOutcome::Ignored;
        }
        self.order.retain(|existing| existing != id);
        MergeOutcome::Removed
    }
}
