//! Domain entities representing core business objects.

pub mod challenge;
pub mod lockout;
pub mod rate_window;
pub mod session_claims;
pub mod verified_session;

// Re-export commonly used types
pub use challenge::{is_well_formed_code, Challenge, CODE_LENGTH};
pub use lockout::Lockout;
pub use rate_window::{RateLimitDecision, RateWindow};
pub use session_claims::{SessionClaims, DEFAULT_ISSUER};
pub use verified_session::VerifiedSession;
