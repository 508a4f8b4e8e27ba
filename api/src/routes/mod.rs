//! Route handlers
//!
//! - `otp` - Issuing and verifying codes
//! - `checkout` - Releasing the checkout URL to verified callers

pub mod checkout;
pub mod otp;

use std::net::IpAddr;

use actix_web::{http::header, HttpRequest};

/// Origin used when neither a proxy header nor a peer address is available
const UNKNOWN_ORIGIN: &str = "0.0.0.0";

/// Extract client IP address from request
///
/// Takes the first `X-Forwarded-For` entry (the proxy chain's client) when
/// it parses as an IP address, then the peer address of the connection.
/// The result is always a canonical IP string.
pub fn extract_client_ip(req: &HttpRequest) -> String {
    let forwarded = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_ORIGIN.to_string())
}

/// Extract the token of an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
