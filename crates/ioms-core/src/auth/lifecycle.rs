//! Startup rehydration and the automatic-logout timer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::session::{SessionStore, State, TOKEN_EXPIRY_KEY, TOKEN_KEY};
use super::storage::Storage;

/// Handle to a pending automatic logout. Dropping it cancels the logout.
pub(crate) struct ExpiryTimer {
    handle: JoinHandle<()>,
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Token and expiry read back from storage
#[derive(Debug, Clone, PartialEq, Eq)]
struct PersistedSession {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Read the stored pair. Anything missing, empty or unreadable counts as absent.
fn read_persisted(storage: &dyn Storage) -> Option<PersistedSession> {
    let token = match storage.get(TOKEN_KEY) {
        Ok(Some(token)) if !token.is_empty() => token,
        Ok(_) => return None,
        Err(e) => {
            warn!(error = %e, "Failed to read stored token");
            return None;
        }
    };

    let raw_expiry = match storage.get(TOKEN_EXPIRY_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("Stored token has no expiry");
            return None;
        }
        Err(e) => {
            warn!(error = %e, "Failed to read stored token expiry");
            return None;
        }
    };

    let expires_at = raw_expiry
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis);

    match expires_at {
        Some(expires_at) => Some(PersistedSession { token, expires_at }),
        None => {
            warn!(value = %raw_expiry, "Stored token expiry is not a timestamp");
            None
        }
    }
}

impl SessionStore {
    /// Restore the session from storage. Runs once at startup.
    ///
    /// A live token is adopted and its remaining lifetime scheduled; anything
    /// else leaves a fully cleared session. Either way loading completes.
    /// Calling this after the session has already resolved does nothing.
    ///
    /// Returns whether a session was restored.
    pub fn rehydrate(&self) -> bool {
        let mut state = self.inner.state.lock();
        if !state.session.loading {
            debug!("Session already resolved, skipping rehydration");
            return state.session.is_authenticated();
        }

        let now = self.now();
        match read_persisted(self.inner.storage.as_ref()) {
            Some(persisted) if now < persisted.expires_at => {
                info!(expires_at = %persisted.expires_at, "Session restored from storage");
                state.session.token = persisted.token;
                state.session.expires_at = Some(persisted.expires_at);
                self.arm_timer(&mut state, persisted.expires_at);
            }
            Some(persisted) => {
                debug!(expires_at = %persisted.expires_at, "Stored session has expired");
                self.clear(&mut state);
            }
            None => self.clear(&mut state),
        }

        state.session.loading = false;
        self.publish(&state);
        state.session.is_authenticated()
    }

    /// Schedule logout at `expires_at`, replacing any timer already armed.
    pub(crate) fn arm_timer(&self, state: &mut State, expires_at: DateTime<Utc>) {
        self.cancel_timer(state);
        let generation = state.generation;

        let delay = (expires_at - self.now()).to_std().unwrap_or_default();

        let Ok(runtime) = Handle::try_current() else {
            warn!("No async runtime, session will not be logged out automatically");
            return;
        };

        let store = Arc::downgrade(&self.inner);
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = store.upgrade() {
                SessionStore { inner }.expire(generation);
            }
        });

        state.timer = Some(ExpiryTimer { handle });
        debug!(delay_ms = delay.as_millis() as u64, "Expiry timer armed");
    }

    pub(crate) fn cancel_timer(&self, state: &mut State) {
        state.generation = state.generation.wrapping_add(1);
        state.timer = None;
    }

    /// Timer callback. A timer superseded by a newer login or logout is a no-op.
    fn expire(&self, generation: u64) {
        let mut state = self.inner.state.lock();
        if state.generation != generation {
            debug!("Ignoring superseded expiry timer");
            return;
        }

        info!("Session expired");
        self.clear(&mut state);
        self.publish(&state);
    }
}
