//! Tests for the challenge engine

mod mocks;
