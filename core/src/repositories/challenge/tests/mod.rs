//! Tests for challenge store implementations

mod memory_tests;
