use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, sync::Arc};

use crate::{
    notifications::Notifier,
    router::{Location, Navigator},
    routes::{PathPrivilegeMap, RouteParams, console::ROOT_PATH, match_path},
};

/// Title of the warning surfaced when a navigation is refused.
pub const ACCESS_DENIED_TITLE: &str = "Access denied";

/// PrivilegeSet
///
/// The privilege identifiers held by a session, or required by a route.
/// Owned by the authentication collaborator; the console only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivilegeSet(BTreeSet<String>);

static NO_PRIVILEGES: PrivilegeSet = PrivilegeSet(BTreeSet::new());

impl PrivilegeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated list, ignoring blanks (`"ViewVendor, ManageRoles"`).
    pub fn parse_list(raw: &str) -> Self {
        raw.split(',')
            .map(str::trim)
            .filter(|privilege| !privilege.is_empty())
            .collect()
    }

    pub fn contains(&self, privilege: &str) -> bool {
        self.0.contains(privilege)
    }

    /// True when at least one privilege is present in both sets.
    pub fn intersects(&self, other: &PrivilegeSet) -> bool {
        self.0.iter().any(|privilege| other.0.contains(privilege))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PrivilegeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// --- Authentication Boundary ---

/// AuthSession
///
/// What the console needs from the authentication collaborator: the resolved privileges
/// of the current user and a way to start or end a session. Token acquisition and refresh
/// live entirely behind this trait.
pub trait AuthSession {
    /// `None` while authentication is still resolving.
    fn privileges(&self) -> Option<&PrivilegeSet>;
    fn login(&mut self);
    fn logout(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionPhase {
    Resolving,
    SignedIn,
    SignedOut,
}

/// StaticSession
///
/// An `AuthSession` with a fixed grant. Starts either resolving or signed in; `login`
/// exposes the grant and `logout` leaves a resolved session with no privileges.
#[derive(Debug, Clone)]
pub struct StaticSession {
    granted: PrivilegeSet,
    phase: SessionPhase,
}

impl StaticSession {
    pub fn resolving(granted: PrivilegeSet) -> Self {
        Self {
            granted,
            phase: SessionPhase::Resolving,
        }
    }

    pub fn signed_in(granted: PrivilegeSet) -> Self {
        Self {
            granted,
            phase: SessionPhase::SignedIn,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.phase == SessionPhase::SignedIn
    }
}

impl AuthSession for StaticSession {
    fn privileges(&self) -> Option<&PrivilegeSet> {
        match self.phase {
            SessionPhase::Resolving => None,
            SessionPhase::SignedIn => Some(&self.granted),
            SessionPhase::SignedOut => Some(&NO_PRIVILEGES),
        }
    }

    fn login(&mut self) {
        self.phase = SessionPhase::SignedIn;
    }

    fn logout(&mut self) {
        self.phase = SessionPhase::SignedOut;
    }
}

// --- Authorization ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

/// authorize
///
/// Decides whether the active location may be shown.
///
/// 1. Privileges not resolved yet: `Allow`. Redirecting during the auth bootstrap would
///    flash the root page on every reload.
/// 2. No index entry matches: `Allow`.
/// 3. The route declares privileges: `Allow` when the user holds any one of them.
/// 4. The route declares none: public, `Allow`.
///
/// This is a navigation convenience. The API enforces authorization on its own.
pub fn authorize(
    index: &PathPrivilegeMap,
    pathname: &str,
    params: &RouteParams,
    user_privileges: Option<&PrivilegeSet>,
) -> Decision {
    let Some(user_privileges) = user_privileges else {
        return Decision::Allow;
    };

    match match_path(pathname, params, index) {
        None => Decision::Allow,
        Some(required) if required.is_empty() => Decision::Allow,
        Some(required) if required.intersects(user_privileges) => Decision::Allow,
        Some(_) => Decision::Deny,
    }
}

/// AuthorizationGate
///
/// Re-runs `authorize` for every location the host reports and performs the deny side
/// effects: navigate to the root path and surface a warning.
///
/// Side effects are keyed on `(allowed, pathname)`. Re-evaluating with the same key (an
/// unrelated re-render, a privilege set that changed without changing the outcome) is
/// silent, which keeps a denied location from redirecting in a loop.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    index: Arc<PathPrivilegeMap>,
    redirect_path: String,
    last_evaluated: Option<(bool, String)>,
}

impl AuthorizationGate {
    pub fn new(index: Arc<PathPrivilegeMap>) -> Self {
        Self {
            index,
            redirect_path: ROOT_PATH.to_string(),
            last_evaluated: None,
        }
    }

    pub fn index(&self) -> &PathPrivilegeMap {
        &self.index
    }

    pub fn evaluate(
        &mut self,
        location: &Location,
        privileges: Option<&PrivilegeSet>,
        navigator: &mut dyn Navigator,
        notifier: &dyn Notifier,
    ) -> Decision {
        let decision = authorize(&self.index, &location.pathname, &location.params, privileges);
        let key = (decision.is_allowed(), location.pathname.clone());

        if self.last_evaluated.as_ref() == Some(&key) {
            return decision;
        }
        self.last_evaluated = Some(key);

        match decision {
            Decision::Allow => {
                tracing::debug!(
                    pathname = %location.pathname,
                    resolved = privileges.is_some(),
                    "navigation allowed"
                );
            }
            Decision::Deny => {
                tracing::warn!(
                    pathname = %location.pathname,
                    redirect = %self.redirect_path,
                    "navigation denied, redirecting"
                );
                navigator.navigate(&self.redirect_path);
                notifier.warning(
                    ACCESS_DENIED_TITLE,
                    &format!("You do not have permission to view {}.", location.pathname),
                );
            }
        }

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_trims_and_skips_blanks() {
        let set = PrivilegeSet::parse_list(" ViewVendor, ,ManageRoles ");
        assert_eq!(set.len(), 2);
        assert!(set.contains("ViewVendor"));
        assert!(set.contains("ManageRoles"));
    }

    #[test]
    fn static_session_phases() {
        let mut session = StaticSession::resolving(PrivilegeSet::from_iter(["ViewOrder"]));
        assert!(session.privileges().is_none());

        session.login();
        assert!(session.is_signed_in());
        assert!(session.privileges().unwrap().contains("ViewOrder"));

        session.logout();
        assert_eq!(session.privileges(), Some(&PrivilegeSet::new()));
    }
}
