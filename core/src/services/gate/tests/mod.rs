//! Tests for the checkout gate
