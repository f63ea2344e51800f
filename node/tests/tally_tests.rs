//! End-to-end behaviour of the tally node over in-memory stores:
//! submission → validation → fan-out → page cache → warm-up/reset.

mod common;

use std::sync::Arc;

use common::{ballot, harness, harness_with, voter, wait_for_rows};
use tally_store_memory::MemoryCacheStore;
use tally_node::{AggregateUpdate, NodeError, TallyConfig};
use tally_nullables::FaultyCacheStore;
use tally_store::{keys, CounterStore, RankedMember, RankedSetStore, VoteStore};
use tally_types::{CandidateId, Rejection, Sex, VoteEvent, VoterId};

async fn voter_votes(counters: &dyn CounterStore, id: u32) -> u64 {
    counters.get(&keys::voter_votes(VoterId::new(id))).await.unwrap()
}

// ---------------------------------------------------------------------------
// Write path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn accepted_vote_updates_every_aggregate_and_stores_a_row() {
    let cache = Arc::new(MemoryCacheStore::new());
    let h = harness_with(cache.clone(), TallyConfig::default()).await;
    let v = voter(2, "V2", 10);

    let outcome = h.node.submit_vote(ballot(&v, "Ada", 4, "math")).await.unwrap();
    assert!(outcome.accepted());
    let page: serde_json::Value = serde_json::from_slice(&outcome.page).unwrap();
    assert_eq!(page["message"], "Your vote has been recorded");

    assert_eq!(voter_votes(cache.as_ref(), 2).await, 4);
    assert_eq!(
        CounterStore::get(cache.as_ref(), &keys::candidate_votes(CandidateId::new(1)))
            .await
            .unwrap(),
        4
    );
    assert_eq!(
        CounterStore::get(cache.as_ref(), &keys::sex_votes(Sex::Female))
            .await
            .unwrap(),
        4
    );
    let words = cache
        .range_by_rank_desc(&keys::candidate_keywords(CandidateId::new(1)), 0, 9)
        .await
        .unwrap();
    assert_eq!(words, vec![RankedMember::new("math", 4)]);

    wait_for_rows(&h.store, 1).await;
    let rows = h.store.iter_votes().unwrap();
    assert_eq!(
        rows,
        vec![VoteEvent {
            voter: VoterId::new(2),
            candidate: CandidateId::new(1),
            keyword: "math".into(),
            count: 4,
        }]
    );
}

#[tokio::test]
async fn second_vote_over_allowance_is_rejected() {
    let cache = Arc::new(MemoryCacheStore::new());
    let h = harness_with(cache.clone(), TallyConfig::default()).await;
    let v = voter(1, "V1", 3);

    let first = h.node.submit_vote(ballot(&v, "Alan", 2, "logic")).await.unwrap();
    assert!(first.accepted());
    let second = h.node.submit_vote(ballot(&v, "Alan", 2, "logic")).await.unwrap();
    assert_eq!(second.rejection, Some(Rejection::AllowanceExceeded));
    let page: serde_json::Value = serde_json::from_slice(&second.page).unwrap();
    assert_eq!(page["message"], "Your vote count exceeds your limit");

    assert_eq!(voter_votes(cache.as_ref(), 1).await, 2);
    let third = h.node.submit_vote(ballot(&v, "Alan", 1, "logic")).await.unwrap();
    assert!(third.accepted());
    assert_eq!(voter_votes(cache.as_ref(), 1).await, 3);
}

#[tokio::test]
async fn empty_keyword_is_rejected_before_any_store_mutation() {
    let cache = Arc::new(MemoryCacheStore::new());
    let h = harness_with(cache.clone(), TallyConfig::default()).await;
    let v = voter(2, "V2", 10);

    let outcome = h.node.submit_vote(ballot(&v, "Ada", 1, "")).await.unwrap();
    assert_eq!(outcome.rejection, Some(Rejection::MissingKeyword));

    assert_eq!(voter_votes(cache.as_ref(), 2).await, 0);
    let board = cache
        .range_by_rank_desc(keys::LEADERBOARD, 0, 9)
        .await
        .unwrap();
    assert!(board.iter().all(|m| m.score == 0));
    assert_eq!(h.store.insert_attempts(), 0);
}

#[tokio::test]
async fn validation_runs_in_order() {
    let h = harness().await;
    let v = voter(2, "V2", 10);

    let cases = [
        (ballot(&v, "", 1, ""), Rejection::MissingCandidate),
        (ballot(&v, "Ada", 1, ""), Rejection::MissingKeyword),
        (ballot(&v, "Nobody", 1, "k"), Rejection::UnknownCandidate),
        (
            {
                let mut b = ballot(&v, "Ada", 1, "k");
                b.address = "elsewhere".into();
                b
            },
            Rejection::InvalidVoter,
        ),
        (
            {
                let mut b = ballot(&v, "Ada", 1, "k");
                b.credential = "missing".into();
                b
            },
            Rejection::InvalidVoter,
        ),
        (ballot(&v, "Ada", 11, "k"), Rejection::AllowanceExceeded),
    ];
    for (ballot, expected) in cases {
        let outcome = h.node.submit_vote(ballot).await.unwrap();
        assert_eq!(outcome.rejection, Some(expected));
    }
    assert_eq!(
        h.node
            .metrics()
            .votes_rejected
            .with_label_values(&["invalid_voter"])
            .get(),
        2
    );
}

#[tokio::test]
async fn malformed_count_is_reported_after_identity_checks() {
    let cache = Arc::new(MemoryCacheStore::new());
    let h = harness_with(cache.clone(), TallyConfig::default()).await;
    let v = voter(2, "V2", 10);

    let mut missing = ballot(&v, "", 1, "k");
    missing.vote_count.clear();
    let outcome = h.node.submit_vote(missing).await.unwrap();
    assert_eq!(outcome.rejection, Some(Rejection::MissingCandidate));

    let mut malformed = ballot(&v, "Ada", 1, "k");
    malformed.vote_count = "abc".into();
    let err = h.node.submit_vote(malformed).await.unwrap_err();
    assert!(matches!(err, NodeError::InvalidVoteCount(_)));
    assert_eq!(voter_votes(cache.as_ref(), 2).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_from_one_voter_respect_allowance() {
    let cache = Arc::new(MemoryCacheStore::new());
    let h = harness_with(cache.clone(), TallyConfig::default()).await;
    let v = voter(3, "V3", 5);

    let mut handles = Vec::new();
    for _ in 0..20 {
        let node = Arc::clone(&h.node);
        let b = ballot(&v, "Grace", 1, "rush");
        handles.push(tokio::spawn(async move { node.submit_vote(b).await }));
    }
    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().accepted() {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 5);
    assert_eq!(voter_votes(cache.as_ref(), 3).await, 5);
}

#[tokio::test]
async fn failing_aggregate_update_reports_fan_out_error() {
    let cache = Arc::new(FaultyCacheStore::new());
    let h = harness_with(cache.clone(), TallyConfig::default()).await;
    cache.break_key(keys::sex_votes(Sex::Male));
    let v = voter(2, "V2", 10);

    let err = h
        .node
        .submit_vote(ballot(&v, "Alan", 3, "logic"))
        .await
        .unwrap_err();
    let NodeError::FanOut(fan_out) = &err else {
        panic!("expected a fan-out error, got {err}");
    };
    assert_eq!(fan_out.failures().len(), 1);
    assert!(fan_out.failed(AggregateUpdate::SexVotes));
    assert!(err.is_unavailable());

    cache.repair_all();
    assert_eq!(
        CounterStore::get(cache.as_ref(), &keys::voter_votes(VoterId::new(2)))
            .await
            .unwrap(),
        3
    );
    assert_eq!(
        CounterStore::get(cache.as_ref(), &keys::candidate_votes(CandidateId::new(2)))
            .await
            .unwrap(),
        3
    );
    assert_eq!(
        CounterStore::get(cache.as_ref(), &keys::sex_votes(Sex::Male))
            .await
            .unwrap(),
        0
    );
    assert_eq!(h.node.metrics().fan_out_failures.get(), 1);
    assert_eq!(h.store.insert_attempts(), 0);
}

// ---------------------------------------------------------------------------
// Read path and page cache
// ---------------------------------------------------------------------------

#[tokio::test]
async fn home_page_is_served_from_cache_until_a_submission() {
    let h = harness().await;
    let misses = || {
        h.node
            .metrics()
            .page_cache_misses
            .with_label_values(&["route"])
            .get()
    };

    let first = h.node.home_page().await.unwrap();
    let second = h.node.home_page().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(misses(), 1);

    // Even a rejected submission flushes the route pages.
    let v = voter(2, "V2", 10);
    let outcome = h.node.submit_vote(ballot(&v, "Ada", 1, "")).await.unwrap();
    assert!(!outcome.accepted());
    h.node.home_page().await.unwrap();
    assert_eq!(misses(), 2);

    h.node.submit_vote(ballot(&v, "Ada", 2, "math")).await.unwrap();
    let after = h.node.home_page().await.unwrap();
    assert_eq!(misses(), 3);
    let page: serde_json::Value = serde_json::from_slice(&after).unwrap();
    assert_eq!(page["candidates"][0]["name"], "Ada");
    assert_eq!(page["candidates"][0]["vote_count"], 2);
    assert_eq!(page["sex_ratio"]["women"], 2);
    assert_eq!(page["parties"][0]["political_party"], "Analytical");
}

#[tokio::test]
async fn candidate_and_party_pages() {
    let h = harness().await;
    let v = voter(2, "V2", 10);
    h.node.submit_vote(ballot(&v, "Ada", 2, "math")).await.unwrap();
    h.node.submit_vote(ballot(&v, "Grace", 3, "cobol")).await.unwrap();

    let page = h
        .node
        .candidate_page(CandidateId::new(1))
        .await
        .unwrap()
        .expect("Ada exists");
    let page: serde_json::Value = serde_json::from_slice(&page).unwrap();
    assert_eq!(page["candidate"]["name"], "Ada");
    assert_eq!(page["votes"], 2);
    assert_eq!(page["keywords"], serde_json::json!(["math"]));

    let party = h
        .node
        .party_page("Analytical")
        .await
        .unwrap()
        .expect("party exists");
    let party: serde_json::Value = serde_json::from_slice(&party).unwrap();
    assert_eq!(party["votes"], 5);
    assert_eq!(party["keywords"], serde_json::json!(["cobol", "math"]));
    assert_eq!(party["candidates"].as_array().unwrap().len(), 2);

    assert!(h.node.candidate_page(CandidateId::new(99)).await.unwrap().is_none());
    assert!(h.node.party_page("Nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn vote_form_lists_candidates_with_empty_message() {
    let h = harness().await;
    let form: serde_json::Value = serde_json::from_slice(&h.node.vote_form().unwrap()).unwrap();
    assert_eq!(form["message"], "");
    assert_eq!(form["candidates"].as_array().unwrap().len(), 3);
}

// ---------------------------------------------------------------------------
// Warm-up and reset
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reset_wipes_votes_and_seeds_zero_scores() {
    let cache = Arc::new(MemoryCacheStore::new());
    let h = harness_with(cache.clone(), TallyConfig::default()).await;
    let v = voter(2, "V2", 10);
    h.node.submit_vote(ballot(&v, "Ada", 4, "math")).await.unwrap();
    h.node.submit_vote(ballot(&v, "Alan", 1, "logic")).await.unwrap();
    wait_for_rows(&h.store, 2).await;

    let report = h.node.reset().await.unwrap();
    assert_eq!(report.candidates, 3);
    assert_eq!(report.votes_replayed, 0);
    assert_eq!(h.store.vote_row_count().unwrap(), 0);

    let last = cache
        .range_by_rank_asc(keys::LEADERBOARD, 0, 0)
        .await
        .unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].score, 0);
    let id: CandidateId = last[0].member.parse().unwrap();
    assert!(h.node.directory().get(id).is_some());
    assert_eq!(voter_votes(cache.as_ref(), 2).await, 0);
}

#[tokio::test]
async fn reset_waits_for_rows_still_being_written() {
    let cache = Arc::new(MemoryCacheStore::new());
    let config = TallyConfig {
        durable_retry_backoff_ms: 20,
        ..TallyConfig::default()
    };
    let h = harness_with(cache.clone(), config).await;
    h.store.fail_next_inserts(2);
    let v = voter(2, "V2", 10);
    let outcome = h.node.submit_vote(ballot(&v, "Ada", 4, "math")).await.unwrap();
    assert!(outcome.accepted());

    let report = h.node.reset().await.unwrap();
    assert_eq!(report.votes_replayed, 0);
    assert_eq!(h.store.insert_attempts(), 3);

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(h.store.vote_row_count().unwrap(), 0);
    assert_eq!(voter_votes(cache.as_ref(), 2).await, 0);
}

#[tokio::test]
async fn warm_up_replays_existing_rows() {
    let cache = Arc::new(MemoryCacheStore::new());
    let h = harness_with(cache.clone(), TallyConfig::default()).await;
    for (candidate, count) in [(1, 2), (3, 5), (99, 7)] {
        h.store
            .insert_vote(&VoteEvent {
                voter: VoterId::new(1),
                candidate: CandidateId::new(candidate),
                keyword: "history".into(),
                count,
            })
            .unwrap();
    }

    let report = h.node.warm_up().await.unwrap();
    assert_eq!(report.votes_replayed, 2);
    assert_eq!(report.votes_skipped, 1);
    assert_eq!(voter_votes(cache.as_ref(), 1).await, 7);
    let top = cache
        .range_by_rank_desc(keys::LEADERBOARD, 0, 0)
        .await
        .unwrap();
    assert_eq!(top, vec![RankedMember::new("3", 5)]);
    let words = cache
        .range_by_rank_desc(&keys::party_keywords("Analytical"), 0, 9)
        .await
        .unwrap();
    assert_eq!(words, vec![RankedMember::new("history", 7)]);
    assert_eq!(h.node.metrics().warm_ups.get(), 2);
}
