//! Core library for ioms, the inventory and order management dashboard.
//!
//! The heart of the crate is the authentication session: [`auth::SessionStore`]
//! owns the token, mirrors it to durable storage, restores it at startup and
//! logs out automatically when the 15-minute lifetime runs out.
//! [`auth::AuthGate`] guards navigation on top of it and [`api::ApiClient`]
//! attaches the token to every backend request.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod routes;

pub use routes::Route;
