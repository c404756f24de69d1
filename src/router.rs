//! Page routes and the navigation guard.
//!
//! Mirrors the pages of the web client: `/` forwards to the listing,
//! `/login` is guest-only, `/books` and `/books/:id` are open to everyone.
//! The guard runs synchronously before a navigation commits and only ever
//! produces one of two outcomes: allow, or redirect to the book listing.

use crate::auth::AuthStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Books,
    BookDetail(u64),
}

impl Route {
    /// Resolve a path to a route. Unknown paths get no route.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.trim_end_matches('/');
        match path {
            "" => Some(Route::Home),
            "/login" => Some(Route::Login),
            "/books" => Some(Route::Books),
            _ => path
                .strip_prefix("/books/")
                .and_then(|id| id.parse().ok())
                .map(Route::BookDetail),
        }
    }

    /// Pages meant only for visitors without a session.
    pub fn is_guest_only(&self) -> bool {
        matches!(self, Route::Login)
    }

    /// Route-table redirect, independent of authentication: the bare root
    /// forwards to the listing.
    pub fn redirect_target(&self) -> Option<Route> {
        match self {
            Route::Home => Some(Route::Books),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Books => "/books".to_string(),
            Route::BookDetail(id) => format!("/books/{}", id),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of the guard for one navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDecision {
    Allow,
    RedirectToBooks,
}

/// Keep it simple: a signed-in user has no business on a guest-only page.
/// Everything else goes through untouched.
pub fn decide(target: &Route, auth: &AuthStore) -> NavDecision {
    if target.is_guest_only() && auth.is_authenticated() {
        NavDecision::RedirectToBooks
    } else {
        NavDecision::Allow
    }
}
