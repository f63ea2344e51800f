//! Tally node: the vote-tally caching subsystem.
//!
//! The node is the central coordinator that:
//! - Validates vote submissions against the voter registry and allowance
//! - Fans accepted votes out to the counter and ranked set stores
//! - Builds leaderboard, candidate and party views from those stores
//! - Caches rendered pages and invalidates them on every submission
//! - Rebuilds all derived state from the relational store on warm-up/reset

pub mod ballot;
pub mod config;
pub mod directory;
pub mod durable;
pub mod error;
pub mod fan_out;
pub mod leaderboard;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod page_cache;
pub mod pages;
pub mod shutdown;
pub mod store_task;
pub mod tracing_spans;
pub mod voter_cache;
pub mod voter_locks;
pub mod voter_pool;
pub mod warm_up;

pub use ballot::{Ballot, VoteForm};
pub use config::TallyConfig;
pub use directory::{CandidateDirectory, DirectoryHandle};
pub use durable::DurableWriter;
pub use error::NodeError;
pub use fan_out::{AggregateUpdate, FanOutError, VoteFanOut};
pub use leaderboard::LeaderboardReader;
pub use logging::{init_logging, LogFormat};
pub use metrics::TallyMetrics;
pub use node::{TallyNode, VoteOutcome};
pub use page_cache::PageCache;
pub use shutdown::ShutdownSignal;
pub use voter_pool::{PooledVoter, VoterPool};
pub use warm_up::WarmUpReport;
