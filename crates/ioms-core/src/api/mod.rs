//! REST API client for the inventory/order backend.
//!
//! Every request carries `Authorization: Bearer <token>` while the shared
//! [`SessionStore`](crate::auth::SessionStore) holds a token. Responses are
//! not inspected for expiry; a 401 surfaces as [`ApiError::Unauthorized`].

pub mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod test_server;

pub use client::ApiClient;
pub use error::ApiError;
