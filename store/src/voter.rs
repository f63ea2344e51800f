//! Voter storage trait.

use tally_types::Voter;

use crate::StoreError;

/// Trait for voter row storage, keyed by credential.
pub trait VoterStore {
    fn put_voter(&self, voter: &Voter) -> Result<(), StoreError>;

    /// Load the voter registered under `credential` into `into`.
    ///
    /// Every field of `into` is overwritten on a hit so pooled records can be
    /// reused. Returns `false` (leaving `into` untouched) when no voter holds
    /// the credential.
    fn load_voter(&self, credential: &str, into: &mut Voter) -> Result<bool, StoreError>;

    fn voter_count(&self) -> Result<u64, StoreError>;
}
