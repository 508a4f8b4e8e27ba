//! Storefront module
//!
//! Resolves a cart's checkout URL through the Storefront GraphQL API.

mod resolver;

pub use resolver::StorefrontCheckoutResolver;
