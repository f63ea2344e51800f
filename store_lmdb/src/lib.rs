//! LMDB relational store for the tally service.
//!
//! Implements the relational traits from `tally-store` using the `heed` LMDB
//! bindings. Each table maps to one LMDB database within a single environment.

pub mod candidate;
pub mod environment;
pub mod error;
pub mod vote;
pub mod voter;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
