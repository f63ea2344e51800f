//! Shared fixtures for the node integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tally_node::{Ballot, TallyConfig, TallyNode};
use tally_nullables::NullElectionStore;
use tally_store::{CounterStore, Fixtures, RankedSetStore, VoteStore};
use tally_store_memory::MemoryCacheStore;
use tally_types::{Candidate, CandidateId, Sex, Voter, VoterId};

pub fn candidate(id: u32, name: &str, party: &str, sex: Sex) -> Candidate {
    Candidate {
        id: CandidateId::new(id),
        name: name.into(),
        political_party: party.into(),
        sex,
    }
}

pub fn voter(id: u32, credential: &str, allowance: u64) -> Voter {
    Voter {
        id: VoterId::new(id),
        name: format!("voter-{id}"),
        address: format!("street-{id}"),
        credential: credential.into(),
        allowance,
    }
}

pub fn fixtures() -> Fixtures {
    Fixtures {
        candidates: vec![
            candidate(1, "Ada", "Analytical", Sex::Female),
            candidate(2, "Alan", "Turing", Sex::Male),
            candidate(3, "Grace", "Analytical", Sex::Female),
        ],
        voters: vec![voter(1, "V1", 3), voter(2, "V2", 10), voter(3, "V3", 5)],
    }
}

pub fn ballot(voter: &Voter, candidate: &str, count: u64, keyword: &str) -> Ballot {
    Ballot {
        name: voter.name.clone(),
        address: voter.address.clone(),
        credential: voter.credential.clone(),
        candidate: candidate.into(),
        vote_count: count.to_string(),
        keyword: keyword.into(),
    }
}

pub struct Harness {
    pub node: Arc<TallyNode>,
    pub store: Arc<NullElectionStore>,
}

/// A warmed-up node over the default fixtures and the given cache store.
pub async fn harness_with<C>(cache: Arc<C>, config: TallyConfig) -> Harness
where
    C: CounterStore + RankedSetStore + 'static,
{
    let store = Arc::new(NullElectionStore::new());
    fixtures().load_into(store.as_ref()).expect("load fixtures");
    let node = Arc::new(TallyNode::new(config, store.clone(), cache.clone(), cache));
    node.warm_up().await.expect("warm up");
    Harness { node, store }
}

pub async fn harness() -> Harness {
    harness_with(Arc::new(MemoryCacheStore::new()), TallyConfig::default()).await
}

/// Wait until the background inserts have produced `rows` vote rows.
pub async fn wait_for_rows(store: &NullElectionStore, rows: u64) {
    for _ in 0..200 {
        if store.vote_row_count().unwrap() >= rows {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "expected {rows} vote rows, found {}",
        store.vote_row_count().unwrap()
    );
}
