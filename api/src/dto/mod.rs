//! Request and response bodies of the HTTP surface

pub mod checkout;
pub mod otp;

pub use checkout::{CheckoutUrlRequest, CheckoutUrlResponse};
pub use otp::{StartRequest, StartResponse, VerifyRequest, VerifyResponse};
