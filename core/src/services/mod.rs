//! Business services containing domain logic and use cases.

pub mod challenge;
pub mod clock;
pub mod codec;
pub mod gate;
pub mod notifier;
pub mod rate_limit;
pub mod session_token;

// Re-export commonly used types
pub use challenge::{ChallengeEngine, ChallengeEngineConfig};
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::CodeCodec;
pub use gate::{CheckoutGate, SubjectAttributeResolver};
pub use notifier::NotifierTrait;
pub use rate_limit::{InMemoryRateLimiter, RateLimitAction, RateLimitPolicy, RateLimiterTrait};
pub use session_token::{SessionTokenConfig, SessionTokenIssuer};
