use admin_console_core::{
    AuthSession, AuthorizationGate, ConsoleState, Decision, MockRepository, Navigator,
    PrivilegeSet, RepositoryState, RouteNode, StaticSession, authorize, build_index,
    auth::ACCESS_DENIED_TITLE,
    config::AppConfig,
    notifications::{NotificationLevel, RecordingNotifier},
    routes::{RouteParams, console::console_routes},
};
use std::sync::Arc;

fn params(pairs: &[(&str, &str)]) -> RouteParams {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn privileges(names: &[&str]) -> PrivilegeSet {
    names.iter().copied().collect()
}

fn console_state() -> ConsoleState {
    let repo = Arc::new(MockRepository::new()) as RepositoryState;
    ConsoleState::new(AppConfig::default(), repo).expect("console routes are well formed")
}

// --- authorize ---

#[test]
fn test_any_single_privilege_is_enough() {
    let tree = vec![RouteNode::new("/reports").requires(["A", "B"])];
    let index = build_index(&tree).unwrap();

    let decision = authorize(&index, "/reports", &RouteParams::new(), Some(&privileges(&["B"])));
    assert_eq!(decision, Decision::Allow);

    let decision = authorize(&index, "/reports", &RouteParams::new(), Some(&privileges(&["C"])));
    assert_eq!(decision, Decision::Deny);
}

#[test]
fn test_unresolved_privileges_fail_open_everywhere() {
    let index = build_index(&console_routes()).unwrap();

    for pattern in index.patterns() {
        let concrete = pattern.replace(':', "");
        assert_eq!(
            authorize(&index, &concrete, &RouteParams::new(), None),
            Decision::Allow,
            "{pattern} must fail open while auth resolves"
        );
    }
    assert_eq!(
        authorize(&index, "/admin/roles", &RouteParams::new(), None),
        Decision::Allow
    );
}

#[test]
fn test_public_child_of_restricted_parent_is_allowed() {
    let tree = vec![
        RouteNode::new("/admin")
            .requires(["A"])
            .child(RouteNode::new("about")),
    ];
    let index = build_index(&tree).unwrap();
    let nobody = PrivilegeSet::new();

    assert_eq!(
        authorize(&index, "/admin/about", &RouteParams::new(), Some(&nobody)),
        Decision::Allow
    );
    assert_eq!(
        authorize(&index, "/admin", &RouteParams::new(), Some(&nobody)),
        Decision::Deny
    );
}

#[test]
fn test_undeclared_path_is_unrestricted() {
    let index = build_index(&console_routes()).unwrap();
    let decision = authorize(
        &index,
        "/not/declared",
        &RouteParams::new(),
        Some(&PrivilegeSet::new()),
    );
    assert_eq!(decision, Decision::Allow);
}

// --- AuthorizationGate ---

#[test]
fn test_vendor_allowed_and_roles_denied_with_redirect() {
    let state = console_state();
    let session = StaticSession::signed_in(privileges(&["ViewVendor"]));
    let notifier = RecordingNotifier::new();
    let mut gate = state.gate();

    let mut router = state.router("/vendors/42");
    assert_eq!(router.location().params, params(&[("vendorId", "42")]));
    let location = router.location().clone();
    let decision = gate.evaluate(&location, session.privileges(), &mut router, &notifier);
    assert_eq!(decision, Decision::Allow);
    assert_eq!(router.location().pathname, "/vendors/42");
    assert_eq!(notifier.count(), 0);

    router.navigate("/admin/roles");
    let location = router.location().clone();
    let decision = gate.evaluate(&location, session.privileges(), &mut router, &notifier);

    assert_eq!(decision, Decision::Deny);
    assert_eq!(router.location().pathname, "/");
    let notifications = notifier.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, NotificationLevel::Warning);
    assert_eq!(notifications[0].title, ACCESS_DENIED_TITLE);
    assert!(notifications[0].message.contains("/admin/roles"));
}

#[test]
fn test_gate_side_effects_fire_once_per_decision_change() {
    let state = console_state();
    let session = StaticSession::signed_in(PrivilegeSet::new());
    let notifier = RecordingNotifier::new();
    let mut gate = state.gate();
    let mut router = state.router("/admin/roles");
    let denied = router.location().clone();

    gate.evaluate(&denied, session.privileges(), &mut router, &notifier);
    // Re-rendering with the same pathname and outcome is silent.
    gate.evaluate(&denied, session.privileges(), &mut router, &notifier);
    gate.evaluate(&denied, session.privileges(), &mut router, &notifier);

    assert_eq!(notifier.count(), 1);
    assert_eq!(router.history(), ["/admin/roles", "/"]);

    // After landing on the root, returning to the denied page redirects again.
    let root = router.location().clone();
    gate.evaluate(&root, session.privileges(), &mut router, &notifier);
    router.navigate("/admin/roles");
    let denied_again = router.location().clone();
    gate.evaluate(&denied_again, session.privileges(), &mut router, &notifier);

    assert_eq!(notifier.count(), 2);
    assert_eq!(router.location().pathname, "/");
}

#[test]
fn test_gate_waits_for_auth_then_denies_after_resolution() {
    let state = console_state();
    let mut session = StaticSession::resolving(privileges(&["ViewOrder"]));
    let notifier = RecordingNotifier::new();
    let mut gate = AuthorizationGate::new(Arc::clone(&state.routes));
    let mut router = state.router("/admin/users");
    let location = router.location().clone();

    assert_eq!(
        gate.evaluate(&location, session.privileges(), &mut router, &notifier),
        Decision::Allow
    );
    assert_eq!(notifier.count(), 0);

    session.login();
    assert_eq!(
        gate.evaluate(&location, session.privileges(), &mut router, &notifier),
        Decision::Deny
    );
    assert_eq!(notifier.count(), 1);
    assert_eq!(router.location().pathname, "/");
}

#[test]
fn test_logout_revokes_restricted_routes() {
    let state = console_state();
    let mut session = StaticSession::signed_in(privileges(&["ViewOrder"]));
    let notifier = RecordingNotifier::new();
    let mut gate = state.gate();
    let mut router = state.router("/orders/7");
    let location = router.location().clone();

    assert!(gate
        .evaluate(&location, session.privileges(), &mut router, &notifier)
        .is_allowed());

    session.logout();
    assert!(!gate
        .evaluate(&location, session.privileges(), &mut router, &notifier)
        .is_allowed());
    assert_eq!(router.location().pathname, "/");
}
