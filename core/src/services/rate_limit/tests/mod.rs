//! Tests for rate limiting
