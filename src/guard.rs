//! Route guards and the app's route table.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every view that needs a signed-in (or signed-out) user goes through
//! `require_authenticated` / `require_anonymous` so redirect behavior is
//! identical everywhere. Decisions are pure functions of the authentication
//! state and the requested location; performing the redirect is the UI
//! layer's job.

pub use crate::session::AuthenticationState;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// A requested in-app location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    /// Query string including the leading `?`, or empty.
    pub search: String,
}

impl Location {
    /// Split `raw` into path and query. A missing leading `/` is added.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (path, search) = match raw.find('?') {
            Some(idx) => (&raw[..idx], &raw[idx..]),
            None => (raw, ""),
        };
        let pathname = if path.starts_with('/') { path.to_owned() } else { format!("/{path}") };
        Self { pathname, search: search.to_owned() }
    }

    /// Path plus query, as it would appear in the address bar.
    #[must_use]
    pub fn href(&self) -> String {
        format!("{}{}", self.pathname, self.search)
    }
}

/// Navigate elsewhere instead of rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
    /// Location that was originally requested.
    pub from: Location,
    /// Replace the current history entry rather than pushing a new one.
    pub replace: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<V> {
    Render(V),
    Redirect(Redirect),
}

impl<V> Guarded<V> {
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }

    pub fn map<W>(self, f: impl FnOnce(V) -> W) -> Guarded<W> {
        match self {
            Self::Render(view) => Guarded::Render(f(view)),
            Self::Redirect(redirect) => Guarded::Redirect(redirect),
        }
    }
}

fn redirect<V>(to: &str, from: &Location) -> Guarded<V> {
    Guarded::Redirect(Redirect { to: to.to_owned(), from: from.clone(), replace: true })
}

/// Render `view` only for a signed-in user; otherwise send them to sign in,
/// remembering where they were going.
pub fn require_authenticated<V>(state: AuthenticationState, location: &Location, view: V) -> Guarded<V> {
    if state.is_authenticated { Guarded::Render(view) } else { redirect(LOGIN_PATH, location) }
}

/// Render `view` only for a signed-out user; otherwise send them home.
pub fn require_anonymous<V>(state: AuthenticationState, location: &Location, view: V) -> Guarded<V> {
    if state.is_authenticated { redirect(HOME_PATH, location) } else { Guarded::Render(view) }
}

/// Where to go after a successful sign-in: the originally requested path, or home.
/// The query is dropped.
#[must_use]
pub fn return_path(from: Option<&Location>) -> String {
    from.filter(|loc| normalize(&loc.pathname) != LOGIN_PATH)
        .map_or_else(|| HOME_PATH.to_owned(), |loc| loc.pathname.clone())
}

// =============================================================================
// ROUTE TABLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Dashboard,
    Login,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Anonymous,
}

pub const ROUTES: &[(&str, View, Access)] = &[
    (HOME_PATH, View::Home, Access::Public),
    (DASHBOARD_PATH, View::Dashboard, Access::Authenticated),
    (LOGIN_PATH, View::Login, Access::Anonymous),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Guarded(Guarded<View>),
    NotFound,
}

fn normalize(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => HOME_PATH,
        trimmed => trimmed,
    }
}

/// Match `location` against [`ROUTES`] and apply the route's guard.
#[must_use]
pub fn resolve(state: AuthenticationState, location: &Location) -> Resolution {
    let path = normalize(&location.pathname);
    let Some(&(_, view, access)) = ROUTES.iter().find(|(route, _, _)| *route == path) else {
        return Resolution::NotFound;
    };
    let guarded = match access {
        Access::Public => Guarded::Render(view),
        Access::Authenticated => require_authenticated(state, location, view),
        Access::Anonymous => require_anonymous(state, location, view),
    };
    Resolution::Guarded(guarded)
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
