//! Views - one per page, each owning a `ViewScope`.

pub mod account;
pub mod comments;
pub mod feed;
pub mod post;
pub mod post_form;

pub use comments::CommentThread;
pub use feed::{FeedSource, FeedView};
pub use post::PostView;
pub use post_form::PostFormView;

use crate::routes::Route;

/// Result of opening a page that may send the reader elsewhere instead.
#[derive(Debug)]
pub enum Opened<V> {
    Show(V),
    Redirect(Route),
    /// The page was torn down before it finished opening.
    Closed,
}

impl<V> Opened<V> {
    pub fn into_view(self) -> Option<V> {
        match self {
            Opened::Show(view) => Some(view),
            Opened::Redirect(_) | Opened::Closed => None,
        }
    }

    pub fn redirect(&self) -> Option<&Route> {
        match self {
            Opened::Redirect(route) => Some(route),
            Opened::Show(_) | Opened::Closed => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Opened::Closed)
    }
}
