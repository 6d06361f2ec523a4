//! Route guard deciding whether a navigation target may render.

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use super::session::{SessionSnapshot, SessionStore};
use crate::routes::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Startup rehydration has not finished
    Unknown,
    Authenticated,
    Unauthenticated,
}

impl GateState {
    pub fn of(snapshot: &SessionSnapshot) -> Self {
        if snapshot.loading {
            GateState::Unknown
        } else if snapshot.is_authenticated() {
            GateState::Authenticated
        } else {
            GateState::Unauthenticated
        }
    }
}

/// What routing needs to know about the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct GateView {
    pub is_authenticated: bool,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Session state unknown; show a neutral waiting state
    Wait,
    Redirect(Route),
    Allow,
}

/// Outcome of a guarded render
#[derive(Debug, PartialEq, Eq)]
pub enum Guarded<T> {
    Rendered(T),
    Waiting,
    Redirected(Route),
}

impl<T> Guarded<T> {
    pub fn rendered(self) -> Option<T> {
        match self {
            Guarded::Rendered(view) => Some(view),
            _ => None,
        }
    }
}

pub struct AuthGate {
    session: SessionStore,
    updates: watch::Receiver<SessionSnapshot>,
}

impl AuthGate {
    pub fn new(session: SessionStore) -> Self {
        let updates = session.subscribe();
        Self { session, updates }
    }

    pub fn state(&self) -> GateState {
        GateState::of(&self.session.snapshot())
    }

    pub fn view(&self) -> GateView {
        let snapshot = self.session.snapshot();
        GateView {
            is_authenticated: snapshot.is_authenticated(),
            loading: snapshot.loading,
        }
    }

    pub fn decide(&self, route: &Route) -> Decision {
        if !route.requires_auth() {
            return Decision::Allow;
        }
        match self.state() {
            GateState::Unknown => Decision::Wait,
            GateState::Unauthenticated => Decision::Redirect(Route::SignIn),
            GateState::Authenticated => Decision::Allow,
        }
    }

    /// Render `route` only if the gate allows it.
    pub fn guard<T>(&self, route: &Route, render: impl FnOnce() -> T) -> Guarded<T> {
        match self.decide(route) {
            Decision::Allow => Guarded::Rendered(render()),
            Decision::Wait => {
                debug!(%route, "Deferring navigation until session resolves");
                Guarded::Waiting
            }
            Decision::Redirect(target) => {
                debug!(%route, %target, "Redirecting unauthenticated navigation");
                Guarded::Redirected(target)
            }
        }
    }

    /// Wait until startup rehydration has resolved the session.
    pub async fn resolved(&mut self) -> GateState {
        // The sender lives in the session we hold, so this cannot fail
        let _ = self.updates.wait_for(|snapshot| !snapshot.loading).await;
        self.state()
    }

    /// Wait for the session to resolve, then guard `route`.
    pub async fn navigate<T>(&mut self, route: &Route, render: impl FnOnce() -> T) -> Guarded<T> {
        if route.requires_auth() {
            self.resolved().await;
        }
        self.guard(route, render)
    }
}
