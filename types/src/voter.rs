//! Voter records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique voter identifier. Keys the per-voter vote counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoterId(u32);

impl VoterId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered voter.
///
/// `credential` is the unique ID-number the voter types into the form. It is
/// the lookup key, but a voter is only accepted when name and address match
/// as well (see [`Voter::matches`]).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub id: VoterId,
    pub name: String,
    pub address: String,
    #[serde(alias = "mynumber")]
    pub credential: String,
    /// Maximum number of votes this voter may ever cast.
    #[serde(alias = "votes")]
    pub allowance: u64,
}

impl Voter {
    /// Whether the submitted identity triple matches this record exactly.
    pub fn matches(&self, name: &str, address: &str, credential: &str) -> bool {
        self.credential == credential && self.name == name && self.address == address
    }

    /// Whether `requested` more votes fit on top of `used`.
    pub fn can_cast(&self, used: u64, requested: u64) -> bool {
        used.checked_add(requested)
            .is_some_and(|total| total <= self.allowance)
    }

    /// Overwrite every field from `other`, reusing existing string buffers.
    pub fn fill_from(&mut self, other: &Voter) {
        self.id = other.id;
        self.name.clone_from(&other.name);
        self.address.clone_from(&other.address);
        self.credential.clone_from(&other.credential);
        self.allowance = other.allowance;
    }

    /// Reset to the empty record while keeping string capacity.
    pub fn clear(&mut self) {
        self.id = VoterId::default();
        self.name.clear();
        self.address.clear();
        self.credential.clear();
        self.allowance = 0;
    }
}
