//! Ranked (sorted) set storage trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::StoreError;

/// One member of a ranked set with its score.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedMember {
    pub member: String,
    pub score: u64,
}

impl RankedMember {
    pub fn new(member: impl Into<String>, score: u64) -> Self {
        Self {
            member: member.into(),
            score,
        }
    }
}

/// Key → (member → score) sorted sets.
///
/// Backs the global leaderboard and the per-candidate / per-party keyword
/// rankings. Rank ranges use inclusive `stop` and are truncated to the set
/// size, like Redis `ZRANGE`. Equal scores are ordered by member bytes:
/// ascending in ascending ranges, descending in descending ranges.
#[async_trait]
pub trait RankedSetStore: Send + Sync {
    /// Add `delta` to `member`'s score in `set` and return the new score.
    ///
    /// A zero delta inserts the member at score zero when absent.
    async fn increment_score(&self, set: &str, member: &str, delta: u64)
        -> Result<u64, StoreError>;

    /// Members ranked `start..=stop` by descending score.
    async fn range_by_rank_desc(
        &self,
        set: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<RankedMember>, StoreError>;

    /// Members ranked `start..=stop` by ascending score.
    async fn range_by_rank_asc(
        &self,
        set: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<RankedMember>, StoreError>;

    /// Remove every set.
    async fn clear(&self) -> Result<(), StoreError>;
}
