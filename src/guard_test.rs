use super::*;

const ANON: AuthenticationState = AuthenticationState::ANONYMOUS;
const AUTHED: AuthenticationState = AuthenticationState::AUTHENTICATED;

// =============================================================================
// Location
// =============================================================================

#[test]
fn location_parse_splits_query() {
    let loc = Location::parse("/dashboard?tab=users");
    assert_eq!(loc.pathname, "/dashboard");
    assert_eq!(loc.search, "?tab=users");
    assert_eq!(loc.href(), "/dashboard?tab=users");
}

#[test]
fn location_parse_adds_leading_slash() {
    assert_eq!(Location::parse("dashboard").pathname, "/dashboard");
    assert_eq!(Location::parse("").pathname, "/");
}

// =============================================================================
// require_authenticated
// =============================================================================

#[test]
fn require_authenticated_redirects_anonymous_to_login_with_from() {
    let requested = Location::parse("/dashboard?tab=users");
    let decision = require_authenticated(ANON, &requested, "dashboard");
    assert_eq!(
        decision,
        Guarded::Redirect(Redirect { to: "/login".into(), from: requested.clone(), replace: true })
    );
}

#[test]
fn require_authenticated_renders_for_signed_in_user() {
    let decision = require_authenticated(AUTHED, &Location::parse("/dashboard"), "dashboard");
    assert_eq!(decision, Guarded::Render("dashboard"));
}

// =============================================================================
// require_anonymous
// =============================================================================

#[test]
fn require_anonymous_sends_signed_in_user_home() {
    let decision = require_anonymous(AUTHED, &Location::parse("/login"), "login");
    let Guarded::Redirect(redirect) = decision else {
        panic!("expected redirect");
    };
    assert_eq!(redirect.to, "/");
    assert_eq!(redirect.from.pathname, "/login");
    assert!(redirect.replace);
}

#[test]
fn require_anonymous_renders_for_anonymous_user() {
    assert_eq!(require_anonymous(ANON, &Location::parse("/login"), 7), Guarded::Render(7));
}

// =============================================================================
// return_path
// =============================================================================

#[test]
fn return_path_uses_original_pathname() {
    let from = Location::parse("/dashboard?tab=users");
    assert_eq!(return_path(Some(&from)), "/dashboard");
}

#[test]
fn return_path_defaults_home() {
    assert_eq!(return_path(None), "/");
}

#[test]
fn return_path_never_loops_back_to_login() {
    assert_eq!(return_path(Some(&Location::parse("/login"))), "/");
}

#[test]
fn return_path_treats_trailing_slash_login_as_login() {
    assert_eq!(return_path(Some(&Location::parse("/login/"))), "/");
    assert_eq!(return_path(Some(&Location::parse("/login/?next=x"))), "/");
}

#[test]
fn login_redirect_round_trips_to_requested_page() {
    let requested = Location::parse("/dashboard");
    let Guarded::Redirect(redirect) = require_authenticated(ANON, &requested, ()) else {
        panic!("expected redirect");
    };
    assert_eq!(return_path(Some(&redirect.from)), "/dashboard");
}

// =============================================================================
// resolve
// =============================================================================

#[test]
fn resolve_home_renders_without_spurious_redirect() {
    for state in [ANON, AUTHED] {
        assert_eq!(resolve(state, &Location::parse("/")), Resolution::Guarded(Guarded::Render(View::Home)));
    }
}

#[test]
fn resolve_dashboard_requires_sign_in() {
    let Resolution::Guarded(decision) = resolve(ANON, &Location::parse("/dashboard")) else {
        panic!("dashboard should be routed");
    };
    assert!(decision.is_redirect());
    assert_eq!(
        resolve(AUTHED, &Location::parse("/dashboard/")),
        Resolution::Guarded(Guarded::Render(View::Dashboard))
    );
}

#[test]
fn resolve_login_is_anonymous_only() {
    assert_eq!(resolve(ANON, &Location::parse("/login")), Resolution::Guarded(Guarded::Render(View::Login)));
    let Resolution::Guarded(Guarded::Redirect(redirect)) = resolve(AUTHED, &Location::parse("/login")) else {
        panic!("expected redirect");
    };
    assert_eq!(redirect.to, HOME_PATH);
}

#[test]
fn resolve_unknown_path_is_not_found() {
    assert_eq!(resolve(AUTHED, &Location::parse("/settings")), Resolution::NotFound);
}

#[test]
fn guarded_map_keeps_redirect() {
    let redirected = require_authenticated(ANON, &Location::parse("/dashboard"), 1).map(|n| n + 1);
    assert!(redirected.is_redirect());
    assert_eq!(require_authenticated(AUTHED, &Location::parse("/dashboard"), 1).map(|n| n + 1), Guarded::Render(2));
}
