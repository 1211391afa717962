//! # Aurora Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Battle fixtures with scripted enemies and stats
//! - Invariant checks for battle state
//! - Determinism test harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod invariants;

/// Re-export proptest for convenience.
pub use proptest;
