//! Nullable infrastructure for deterministic testing.
//!
//! The relational store and the cache stores are abstracted behind traits in
//! `tally-store`. This crate provides test-friendly implementations that:
//! - Keep everything in memory
//! - Can be told to fail on demand
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod cache;
pub mod store;

pub use cache::FaultyCacheStore;
pub use store::NullElectionStore;
