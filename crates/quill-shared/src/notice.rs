//! User-facing notices - how a view surfaces a failure.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Dismissible banner above the content.
    Banner,
    /// Messages shown next to the form fields.
    Inline,
    /// Navigate elsewhere instead of showing anything.
    Redirect,
    /// Nothing to show; render the empty state.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,

    /// Short, human-readable summary.
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Per-field messages for inline notices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,

    /// Target path for redirects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            detail: None,
            messages: Vec::new(),
            redirect_to: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn dismissible(&self) -> bool {
        self.kind == NoticeKind::Banner
    }

    pub fn banner(detail: impl Into<String>) -> Self {
        Self::new(NoticeKind::Banner, "Something went wrong").with_detail(detail)
    }

    pub fn inline(messages: Vec<String>) -> Self {
        Self {
            messages,
            ..Self::new(NoticeKind::Inline, "Please fix the highlighted fields")
        }
    }

    pub fn redirect(path: impl Into<String>) -> Self {
        Self {
            redirect_to: Some(path.into()),
            ..Self::new(NoticeKind::Redirect, "Redirecting")
        }
    }

    pub fn login_required() -> Self {
        Self::redirect("/login").with_detail("Please sign in to continue.")
    }

    pub fn nothing_to_show(detail: impl Into<String>) -> Self {
        Self::new(NoticeKind::Empty, "Nothing to show").with_detail(detail)
    }
}
