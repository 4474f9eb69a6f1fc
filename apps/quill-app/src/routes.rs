//! Route table and auth guards.

use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    AllPosts,
    AddPost,
    EditPost(String),
    Post(String),
}

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Signed-in readers only; others go to the login page.
    SignedIn,
    /// Signed-out visitors only; readers go home.
    SignedOut,
}

/// Outcome of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Some(Route::Home),
            ["login"] => Some(Route::Login),
            ["signup"] => Some(Route::Signup),
            ["all-posts"] => Some(Route::AllPosts),
            ["add-post"] => Some(Route::AddPost),
            ["edit-post", slug] => Some(Route::EditPost(slug.to_string())),
            ["post", slug] => Some(Route::Post(slug.to_string())),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::AllPosts => "/all-posts".to_string(),
            Route::AddPost => "/add-post".to_string(),
            Route::EditPost(slug) => format!("/edit-post/{slug}"),
            Route::Post(slug) => format!("/post/{slug}"),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Home | Route::Post(_) => Access::Public,
            Route::Login | Route::Signup => Access::SignedOut,
            Route::AllPosts | Route::AddPost | Route::EditPost(_) => Access::SignedIn,
        }
    }

    /// Apply the route's guard for a reader who is (or is not) signed in.
    pub fn guard(self, signed_in: bool) -> Navigation {
        match (self.access(), signed_in) {
            (Access::SignedIn, false) => Navigation::Redirect(Route::Login),
            (Access::SignedOut, true) => Navigation::Redirect(Route::Home),
            _ => Navigation::Render(self),
        }
    }
}

/// Resolve a path against the current session.
pub async fn resolve(state: &AppState, path: &str) -> Navigation {
    let Some(route) = Route::parse(path) else {
        tracing::debug!(path = %path, "No route");
        return Navigation::NotFound;
    };
    let signed_in = state.auth.current_user().await.is_some();
    let nav = route.guard(signed_in);
    tracing::debug!(path = %path, signed_in, ?nav, "Route resolved");
    nav
}
