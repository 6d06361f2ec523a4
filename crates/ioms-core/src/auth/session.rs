use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::lifecycle::ExpiryTimer;
use super::storage::Storage;

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key holding the expiry as decimal epoch milliseconds
pub const TOKEN_EXPIRY_KEY: &str = "tokenExpiry";

/// Token expiry time in minutes.
/// Tokens are never renewed; a new one requires a fresh login.
pub const TOKEN_EXPIRY_MINUTES: i64 = 15;

/// Lifetime of a token issued by [`SessionStore::login`].
pub fn token_ttl() -> Duration {
    Duration::minutes(TOKEN_EXPIRY_MINUTES)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct User {
    pub email: String,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Point-in-time copy of the session, handed to readers and subscribers.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Opaque bearer token. Empty means unauthenticated.
    pub token: String,
    pub user: Option<User>,
    pub expires_at: Option<DateTime<Utc>>,
    /// True until startup rehydration (or a login) has resolved the session
    pub loading: bool,
}

impl SessionSnapshot {
    fn unresolved() -> Self {
        Self {
            token: String::new(),
            user: None,
            expires_at: None,
            loading: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }
}

impl std::fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = if self.token.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("SessionSnapshot")
            .field("token", &token)
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .field("loading", &self.loading)
            .finish()
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot log in with an empty token")]
    EmptyToken,
}

pub(crate) struct State {
    pub(crate) session: SessionSnapshot,
    pub(crate) timer: Option<ExpiryTimer>,
    /// Bumped whenever the armed timer is replaced or cancelled
    pub(crate) generation: u64,
}

pub(crate) struct Inner {
    pub(crate) state: Mutex<State>,
    pub(crate) storage: Arc<dyn Storage>,
    pub(crate) clock: Arc<dyn Clock>,
    tx: watch::Sender<SessionSnapshot>,
}

/// The single owner of authentication state.
///
/// Clone is cheap and every clone refers to the same session. All mutation goes
/// through [`login`](Self::login), [`logout`](Self::logout) and
/// [`rehydrate`](Self::rehydrate); everything else is a read.
///
/// Timers are spawned on the ambient tokio runtime.
#[derive(Clone)]
pub struct SessionStore {
    pub(crate) inner: Arc<Inner>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    pub fn with_clock(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        let initial = SessionSnapshot::unresolved();
        let (tx, _) = watch::channel(initial.clone());
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    session: initial,
                    timer: None,
                    generation: 0,
                }),
                storage,
                clock,
                tx,
            }),
        }
    }

    /// Start a session for `user`, valid for [`token_ttl`] from now.
    ///
    /// Replaces any existing session and its expiry timer. A failure to persist
    /// is logged and does not undo the in-memory login.
    pub fn login(&self, user: User, token: impl Into<String>) -> Result<(), SessionError> {
        let token = token.into();
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }

        let expires_at = self.now() + token_ttl();
        let mut state = self.inner.state.lock();

        self.persist(&token, expires_at);
        info!(email = %user.email, %expires_at, "Logged in");

        state.session.token = token;
        state.session.user = Some(user);
        state.session.expires_at = Some(expires_at);
        state.session.loading = false;
        self.arm_timer(&mut state, expires_at);

        self.publish(&state);
        Ok(())
    }

    /// End the session. Safe to call when already logged out.
    pub fn logout(&self) {
        let mut state = self.inner.state.lock();
        self.clear(&mut state);
        self.publish(&state);
    }

    pub(crate) fn clear(&self, state: &mut State) {
        let was_authenticated = state.session.is_authenticated();

        state.session.token.clear();
        state.session.user = None;
        state.session.expires_at = None;
        self.cancel_timer(state);
        self.unpersist();

        if was_authenticated {
            info!("Logged out");
        } else {
            debug!("Logout with no active session");
        }
    }

    fn persist(&self, token: &str, expires_at: DateTime<Utc>) {
        let storage = &self.inner.storage;
        let result = storage.set(TOKEN_KEY, token).and_then(|_| {
            storage.set(TOKEN_EXPIRY_KEY, &expires_at.timestamp_millis().to_string())
        });
        if let Err(e) = result {
            warn!(error = %e, "Failed to save session");
        }
    }

    fn unpersist(&self) {
        let storage = &self.inner.storage;
        let result = storage
            .remove(TOKEN_KEY)
            .and_then(|_| storage.remove(TOKEN_EXPIRY_KEY));
        if let Err(e) = result {
            warn!(error = %e, "Failed to clear saved session");
        }
    }

    pub(crate) fn publish(&self, state: &State) {
        self.inner.tx.send_replace(state.session.clone());
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    // ===== Read-only views =====

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.lock().session.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.lock().session.is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.lock().session.loading
    }

    /// Get the bearer token if logged in
    pub fn token(&self) -> Option<String> {
        let state = self.inner.state.lock();
        Some(state.session.token.clone()).filter(|t| !t.is_empty())
    }

    pub fn user(&self) -> Option<User> {
        self.inner.state.lock().session.user.clone()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.inner.state.lock().session.expires_at
    }

    /// Time left before automatic logout, clamped at zero
    pub fn time_until_expiry(&self) -> Option<Duration> {
        self.expires_at()
            .map(|expiry| (expiry - self.now()).max(Duration::zero()))
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        self.time_until_expiry()
            .map(|d| d.num_minutes())
            .unwrap_or(0)
    }

    /// Whether an automatic logout is currently scheduled
    pub fn has_expiry_timer(&self) -> bool {
        self.inner.state.lock().timer.is_some()
    }

    /// Receive a fresh snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.tx.subscribe()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("SessionStore")
            .field("authenticated", &state.session.is_authenticated())
            .field("user", &state.session.user)
            .field("expires_at", &state.session.expires_at)
            .field("loading", &state.session.loading)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;
    use crate::auth::storage::{MemoryStorage, Storage};

    fn store() -> (SessionStore, Arc<MemoryStorage>, Arc<ManualClock>) {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::default());
        let session = SessionStore::with_clock(storage.clone(), clock.clone());
        (session, storage, clock)
    }

    #[tokio::test]
    async fn test_login_persists_token_and_expiry() {
        let (session, storage, clock) = store();
        let now = clock.now();

        session.login(User::new("a@b.com"), "tok123").unwrap();

        assert!(session.is_authenticated());
        assert!(!session.is_loading());
        assert_eq!(session.token().as_deref(), Some("tok123"));
        assert_eq!(session.user(), Some(User::new("a@b.com")));
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok123"));

        let expiry: i64 = storage.get(TOKEN_EXPIRY_KEY).unwrap().unwrap().parse().unwrap();
        assert_eq!(expiry, now.timestamp_millis() + 900_000);
        assert_eq!(session.expires_at(), Some(now + Duration::milliseconds(900_000)));
    }

    #[tokio::test]
    async fn test_login_rejects_empty_token() {
        let (session, storage, _) = store();

        assert_eq!(
            session.login(User::new("a@b.com"), ""),
            Err(SessionError::EmptyToken)
        );
        assert!(!session.is_authenticated());
        assert!(session.is_loading());
        assert!(storage.is_empty());
        assert!(!session.has_expiry_timer());
    }

    #[tokio::test]
    async fn test_logout_clears_memory_and_storage() {
        let (session, storage, _) = store();
        session.login(User::new("a@b.com"), "tok123").unwrap();

        session.logout();

        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert_eq!(session.user(), None);
        assert_eq!(session.expires_at(), None);
        assert!(!session.has_expiry_timer());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let (session, storage, _) = store();
        session.login(User::new("a@b.com"), "tok123").unwrap();

        session.logout();
        let once = session.snapshot();
        session.logout();

        assert_eq!(session.snapshot(), once);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_logout_when_never_logged_in() {
        let (session, storage, _) = store();
        session.logout();
        assert!(!session.is_authenticated());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_time_until_expiry() {
        let (session, _, clock) = store();
        assert_eq!(session.time_until_expiry(), None);
        assert_eq!(session.minutes_until_expiry(), 0);

        session.login(User::new("a@b.com"), "tok123").unwrap();
        assert_eq!(session.minutes_until_expiry(), 15);

        clock.advance(Duration::minutes(10));
        assert_eq!(session.minutes_until_expiry(), 5);

        clock.advance(Duration::minutes(10));
        assert_eq!(session.time_until_expiry(), Some(Duration::zero()));
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let (session, _, _) = store();
        let mut rx = session.subscribe();
        assert!(rx.borrow().loading);

        session.login(User::new("a@b.com"), "tok123").unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated());

        session.logout();
        assert!(!rx.borrow_and_update().is_authenticated());
    }

    #[tokio::test]
    async fn test_debug_hides_token() {
        let (session, _, _) = store();
        session.login(User::new("a@b.com"), "secret-token").unwrap();
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("a@b.com"));
    }

    #[tokio::test]
    async fn test_snapshot_debug_redacts_token() {
        let (session, _, _) = store();
        let debug = format!("{:?}", session.snapshot());
        assert!(!debug.contains("<redacted>"));

        session.login(User::new("a@b.com"), "secret-token").unwrap();
        let debug = format!("{:?}", session.snapshot());
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("a@b.com"));
    }
}
