//! OTP challenge endpoints

pub mod start;
pub mod verify;

pub use start::start;
pub use verify::verify;
