//! Checkout gate module
//!
//! Releases a subject's checkout URL only to a caller holding a valid
//! session token for that subject while its verified session is live.

mod resolver;
mod service;

#[cfg(test)]
mod tests;

pub use resolver::SubjectAttributeResolver;
pub use service::CheckoutGate;
