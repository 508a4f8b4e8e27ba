//! Session token module
//!
//! Signs the compact, expiring credential handed out after a successful
//! verification and validates it on the way back in.

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::SessionTokenConfig;
pub use service::SessionTokenIssuer;
