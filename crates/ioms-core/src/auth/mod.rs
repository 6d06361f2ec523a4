//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `SessionStore`: the single owner of token, user and loading state
//! - Startup rehydration and the automatic-logout timer (`lifecycle`)
//! - `AuthGate`: route guard over the session
//! - `Storage` backends the session is mirrored to
//!
//! Tokens expire 15 minutes after login and are never renewed.

pub mod clock;
pub mod credentials;
pub mod gate;
pub mod lifecycle;
pub mod session;
pub mod signin;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::KeyringStorage;
pub use gate::{AuthGate, Decision, GateState, GateView, Guarded};
pub use session::{
    token_ttl, SessionError, SessionSnapshot, SessionStore, User, TOKEN_EXPIRY_KEY,
    TOKEN_EXPIRY_MINUTES, TOKEN_KEY,
};
pub use signin::{
    login_error_message, sign_in, sign_out, sign_up, signup_error_message, REGISTERED,
};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
