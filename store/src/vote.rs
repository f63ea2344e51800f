//! Vote row storage trait.

use tally_types::VoteEvent;

use crate::StoreError;

/// Append-only vote rows. Rows are only ever removed wholesale by a reset.
pub trait VoteStore {
    fn insert_vote(&self, vote: &VoteEvent) -> Result<(), StoreError>;

    /// Every stored vote in insertion order.
    fn iter_votes(&self) -> Result<Vec<VoteEvent>, StoreError>;

    /// Number of vote rows (not the sum of their counts).
    fn vote_row_count(&self) -> Result<u64, StoreError>;

    /// Delete every vote row and return how many were removed.
    fn delete_all_votes(&self) -> Result<u64, StoreError>;
}
