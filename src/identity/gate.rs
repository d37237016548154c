//! Access gate: decides whether a page may render or where to send the user
//! instead.

use tokio::sync::watch;
use tracing::debug;

use super::principal::{Identity, Role};
use super::session::SessionState;

pub const HOME_PATH: &str = "/home";
pub const LOGIN_PATH: &str = "/login";

/// The two gate variants a route can sit behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Only visitors who are not logged in (login, signup).
    GuestOnly,
    /// Logged-in visitors, optionally restricted to one role.
    Authenticated { role: Option<Role> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Hydration has not finished; show a neutral placeholder.
    Pending,
    Allow,
    Redirect(&'static str),
}

/// Pure gate decision.
///
/// Hydration is checked before identity: a `None` identity is ambiguous until
/// the stored token has been read.
pub fn decide(identity: Option<&Identity>, hydrating: bool, gate: Gate) -> Decision {
    if hydrating {
        return Decision::Pending;
    }
    match gate {
        Gate::GuestOnly => match identity {
            Some(_) => Decision::Redirect(HOME_PATH),
            None => Decision::Allow,
        },
        Gate::Authenticated { role } => match (identity, role) {
            (None, _) => Decision::Redirect(LOGIN_PATH),
            (Some(id), Some(required)) if id.role != required => Decision::Redirect(HOME_PATH),
            (Some(_), _) => Decision::Allow,
        },
    }
}

impl Gate {
    pub fn any_user() -> Self { Gate::Authenticated { role: None } }
    pub fn role(role: Role) -> Self { Gate::Authenticated { role: Some(role) } }

    pub fn decide(&self, state: &SessionState) -> Decision {
        decide(state.identity.as_ref(), state.hydrating, *self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Pending,
    Allowed,
    Redirected(&'static str),
}

/// Gate bound to one mounted page.
///
/// Leaves `Pending` once, when hydration ends. After that it re-decides only
/// when the identity differs from the one it last decided on, so an explicit
/// logout can move an allowed page to redirected.
#[derive(Debug, Clone)]
pub struct GateWatch {
    gate: Gate,
    state: GateState,
    decided_for: Option<Option<Identity>>,
}

impl GateWatch {
    pub fn new(gate: Gate) -> Self { Self { gate, state: GateState::Pending, decided_for: None } }

    pub fn gate(&self) -> Gate { self.gate }

    pub fn state(&self) -> GateState { self.state }

    pub fn observe(&mut self, session: &SessionState) -> GateState {
        if session.hydrating {
            return self.state;
        }
        if self.decided_for.as_ref() == Some(&session.identity) {
            return self.state;
        }
        self.state = match self.gate.decide(session) {
            Decision::Pending => GateState::Pending,
            Decision::Allow => GateState::Allowed,
            Decision::Redirect(to) => GateState::Redirected(to),
        };
        debug!(target: "libris::gate", gate = ?self.gate, state = ?self.state, "gate decided");
        self.decided_for = Some(session.identity.clone());
        self.state
    }

    /// Wait for hydration to end, then decide.
    pub async fn settle(&mut self, rx: &mut watch::Receiver<SessionState>) -> GateState {
        let waited = rx.wait_for(|s| !s.hydrating).await.map(|s| s.clone());
        let snapshot = match waited {
            Ok(s) => s,
            // Store dropped mid-hydration: judge what was last published
            Err(_) => rx.borrow().clone(),
        };
        self.observe(&snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(name: &str) -> Identity { Identity::new(name, Role::Reader) }
    fn librarian(name: &str) -> Identity { Identity::new(name, Role::Librarian) }
    fn hydrated(identity: Option<Identity>) -> SessionState { SessionState { identity, hydrating: false } }

    #[test]
    fn guest_gate_allows_anonymous_and_redirects_users_home() {
        assert_eq!(decide(None, false, Gate::GuestOnly), Decision::Allow);
        assert_eq!(decide(Some(&reader("bob")), false, Gate::GuestOnly), Decision::Redirect("/home"));
        assert_eq!(decide(Some(&librarian("amy")), false, Gate::GuestOnly), Decision::Redirect("/home"));
    }

    #[test]
    fn librarian_gate() {
        let g = Gate::role(Role::Librarian);
        assert_eq!(decide(Some(&reader("bob")), false, g), Decision::Redirect("/home"));
        assert_eq!(decide(None, false, g), Decision::Redirect("/login"));
        assert_eq!(decide(Some(&librarian("amy")), false, g), Decision::Allow);
    }

    #[test]
    fn any_user_gate_accepts_both_roles() {
        let g = Gate::any_user();
        assert_eq!(decide(Some(&reader("bob")), false, g), Decision::Allow);
        assert_eq!(decide(Some(&librarian("amy")), false, g), Decision::Allow);
        assert_eq!(decide(None, false, g), Decision::Redirect("/login"));
    }

    #[test]
    fn hydrating_is_always_pending() {
        for gate in [Gate::GuestOnly, Gate::any_user(), Gate::role(Role::Reader), Gate::role(Role::Librarian)] {
            assert_eq!(decide(None, true, gate), Decision::Pending);
            assert_eq!(decide(Some(&reader("bob")), true, gate), Decision::Pending);
            assert_eq!(decide(Some(&librarian("amy")), true, gate), Decision::Pending);
        }
    }

    #[test]
    fn watch_stays_pending_until_hydrated() {
        let mut w = GateWatch::new(Gate::any_user());
        let pending = SessionState { identity: None, hydrating: true };
        assert_eq!(w.observe(&pending), GateState::Pending);
        assert_eq!(w.observe(&hydrated(Some(reader("bob")))), GateState::Allowed);
    }

    #[test]
    fn watch_redecides_only_on_identity_change() {
        let mut w = GateWatch::new(Gate::role(Role::Reader));
        let bob = hydrated(Some(reader("bob")));
        assert_eq!(w.observe(&bob), GateState::Allowed);
        assert_eq!(w.observe(&bob), GateState::Allowed);
        // logout while mounted
        assert_eq!(w.observe(&hydrated(None)), GateState::Redirected("/login"));
    }

    #[test]
    fn guest_page_redirects_after_login() {
        let mut w = GateWatch::new(Gate::GuestOnly);
        assert_eq!(w.observe(&hydrated(None)), GateState::Allowed);
        assert_eq!(w.observe(&hydrated(Some(librarian("amy")))), GateState::Redirected("/home"));
    }

    #[tokio::test]
    async fn settle_waits_for_hydration() {
        let (tx, mut rx) = watch::channel(SessionState::default());
        let mut w = GateWatch::new(Gate::GuestOnly);
        let handle = tokio::spawn(async move {
            let st = w.settle(&mut rx).await;
            (st, w)
        });
        tx.send_replace(SessionState { identity: Some(reader("bob")), hydrating: false });
        let (st, w) = handle.await.unwrap();
        assert_eq!(st, GateState::Redirected("/home"));
        assert_eq!(w.state(), GateState::Redirected("/home"));
    }
}
