//! HTTP server for the tally service.
//!
//! Provides endpoints for:
//! - Homepage leaderboard, candidate and party pages
//! - The vote form and vote submission
//! - Reset (`/initialize`)
//! - Prometheus metrics

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{router, RpcServer};
