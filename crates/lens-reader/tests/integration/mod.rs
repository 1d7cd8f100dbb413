//! Integration tests for lens-reader.
//!
//! These tests drive both readers against an in-memory chain:
//! - Native vs. wrapped branch selection
//! - Batch ordering, fail-fast and cancellation
//! - Field isolation between balance and allowance sources

pub mod fixtures;
