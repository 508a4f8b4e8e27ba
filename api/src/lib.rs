//! HTTP surface of CheckoutGate
//!
//! Exposes the challenge engine and the checkout gate over Actix-web. The
//! binary in `main.rs` wires configuration and adapters; tests drive
//! [`create_app`] directly.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod routes;

pub use app::{create_app, AppState, CookieSettings, Engine, Gate};
