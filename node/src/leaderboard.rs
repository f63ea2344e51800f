//! Read-side views built from the cache stores only.
//!
//! Nothing here touches the relational store; candidate metadata comes from
//! the directory snapshot the caller already holds.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::try_join_all;
use tally_store::{keys, CounterStore, RankedMember, RankedSetStore, StoreError};
use tally_types::{Candidate, CandidateId, CandidateResult, PartyResult, Sex, SexRatio};
use tracing::warn;

use crate::directory::CandidateDirectory;
use crate::pages::{CandidatePage, HomePage, PartyPage};

/// Leaderboard entries and keyword rankings shown per page.
pub const TOP_N: usize = 10;

#[derive(Clone)]
pub struct LeaderboardReader {
    counters: Arc<dyn CounterStore>,
    sets: Arc<dyn RankedSetStore>,
}

impl LeaderboardReader {
    pub fn new(counters: Arc<dyn CounterStore>, sets: Arc<dyn RankedSetStore>) -> Self {
        Self { counters, sets }
    }

    /// Homepage: top ten plus last place, party totals over those entries,
    /// and the sex split.
    pub async fn home(&self, directory: &CandidateDirectory) -> Result<HomePage, StoreError> {
        let mut ranked = self
            .sets
            .range_by_rank_desc(keys::LEADERBOARD, 0, TOP_N - 1)
            .await?;
        // Last place is appended even when it already appears in the top ten.
        ranked.extend(self.sets.range_by_rank_asc(keys::LEADERBOARD, 0, 0).await?);

        let mut candidates = Vec::with_capacity(ranked.len());
        let mut party_totals: HashMap<&str, u64> = HashMap::new();
        for RankedMember { member, score } in ranked {
            let Some(candidate) = resolve(directory, &member) else {
                continue;
            };
            *party_totals
                .entry(candidate.political_party.as_str())
                .or_default() += score;
            candidates.push(CandidateResult {
                candidate: candidate.clone(),
                vote_count: score,
            });
        }

        let mut parties: Vec<PartyResult> = party_totals
            .into_iter()
            .map(|(party, vote_count)| PartyResult {
                political_party: party.to_string(),
                vote_count,
            })
            .collect();
        parties.sort_by(|a, b| {
            (Reverse(a.vote_count), &a.political_party)
                .cmp(&(Reverse(b.vote_count), &b.political_party))
        });

        let mut sex_ratio = SexRatio::default();
        for sex in Sex::ALL {
            sex_ratio.set(sex, self.counters.get(&keys::sex_votes(sex)).await?);
        }

        Ok(HomePage {
            candidates,
            parties,
            sex_ratio,
        })
    }

    pub async fn candidate<'a>(
        &self,
        candidate: &'a Candidate,
    ) -> Result<CandidatePage<'a>, StoreError> {
        let votes = self
            .counters
            .get(&keys::candidate_votes(candidate.id))
            .await?;
        let keywords = self
            .top_keywords(&keys::candidate_keywords(candidate.id))
            .await?;
        Ok(CandidatePage {
            candidate,
            votes,
            keywords,
        })
    }

    /// Party view. `members` are the party's candidates from the directory.
    pub async fn party<'a>(
        &self,
        party: &'a str,
        members: Vec<&'a Candidate>,
    ) -> Result<PartyPage<'a>, StoreError> {
        let vote_keys: Vec<String> = members
            .iter()
            .map(|c| keys::candidate_votes(c.id))
            .collect();
        let votes = try_join_all(vote_keys.iter().map(|key| self.counters.get(key)))
            .await?
            .into_iter()
            .sum();
        let keywords = self.top_keywords(&keys::party_keywords(party)).await?;
        Ok(PartyPage {
            political_party: party,
            votes,
            candidates: members,
            keywords,
        })
    }

    async fn top_keywords(&self, set: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .sets
            .range_by_rank_desc(set, 0, TOP_N - 1)
            .await?
            .into_iter()
            .map(|entry| entry.member)
            .collect())
    }
}

fn resolve<'a>(directory: &'a CandidateDirectory, member: &str) -> Option<&'a Candidate> {
    let candidate = member
        .parse::<CandidateId>()
        .ok()
        .and_then(|id| directory.get(id));
    if candidate.is_none() {
        warn!(member, "Leaderboard member has no directory entry, skipping");
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_store_memory::MemoryCacheStore;

    fn candidate(id: u32, name: &str, party: &str, sex: Sex) -> Candidate {
        Candidate {
            id: CandidateId::new(id),
            name: name.into(),
            political_party: party.into(),
            sex,
        }
    }

    async fn seeded(
        scores: &[(u32, u64)],
    ) -> (Arc<MemoryCacheStore>, LeaderboardReader) {
        let store = Arc::new(MemoryCacheStore::new());
        for (id, score) in scores {
            store
                .increment_score(keys::LEADERBOARD, &id.to_string(), *score)
                .await
                .unwrap();
        }
        let reader = LeaderboardReader::new(store.clone(), store.clone());
        (store, reader)
    }

    #[tokio::test]
    async fn home_lists_top_ten_then_last_place() {
        let directory = CandidateDirectory::new(
            (1..=12)
                .map(|i| candidate(i, &format!("c{i}"), "P", Sex::Male))
                .collect(),
        );
        let scores: Vec<(u32, u64)> = (1..=12).map(|i| (i, u64::from(i) * 10)).collect();
        let (_store, reader) = seeded(&scores).await;

        let home = reader.home(&directory).await.unwrap();
        let ids: Vec<u32> = home
            .candidates
            .iter()
            .map(|c| c.candidate.id.as_u32())
            .collect();
        assert_eq!(ids, vec![12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 1]);
        assert_eq!(home.candidates[10].vote_count, 10);
    }

    #[tokio::test]
    async fn ties_keep_a_stable_order() {
        let directory = CandidateDirectory::new(vec![
            candidate(1, "A", "P", Sex::Male),
            candidate(2, "B", "P", Sex::Male),
            candidate(3, "C", "P", Sex::Male),
        ]);
        let (_store, reader) = seeded(&[(1, 10), (2, 5), (3, 5)]).await;

        let first = reader.home(&directory).await.unwrap();
        let second = reader.home(&directory).await.unwrap();
        let names = |home: &HomePage| -> Vec<String> {
            home.candidates
                .iter()
                .map(|c| c.candidate.name.clone())
                .collect()
        };
        assert_eq!(names(&first)[0], "A");
        assert_eq!(names(&first), names(&second));
        assert_eq!(names(&first)[1..3], ["C".to_string(), "B".to_string()]);
    }

    #[tokio::test]
    async fn party_totals_cover_displayed_entries_sorted_desc() {
        let directory = CandidateDirectory::new(vec![
            candidate(1, "A", "Red", Sex::Male),
            candidate(2, "B", "Blue", Sex::Female),
            candidate(3, "C", "Blue", Sex::Female),
            candidate(4, "D", "Green", Sex::Male),
        ]);
        let (store, reader) = seeded(&[(1, 9), (2, 5), (3, 4), (4, 1)]).await;
        CounterStore::increment(store.as_ref(), &keys::sex_votes(Sex::Female), 9)
            .await
            .unwrap();

        let home = reader.home(&directory).await.unwrap();
        // Green's single candidate is also last place, so it is counted twice.
        let parties: Vec<(&str, u64)> = home
            .parties
            .iter()
            .map(|p| (p.political_party.as_str(), p.vote_count))
            .collect();
        assert_eq!(parties, vec![("Blue", 9), ("Red", 9), ("Green", 2)]);
        assert_eq!(home.sex_ratio, SexRatio { men: 0, women: 9 });
    }

    #[tokio::test]
    async fn unknown_members_are_skipped() {
        let directory = CandidateDirectory::new(vec![candidate(1, "A", "P", Sex::Male)]);
        let (_store, reader) = seeded(&[(1, 3), (99, 50)]).await;
        let home = reader.home(&directory).await.unwrap();
        assert!(home
            .candidates
            .iter()
            .all(|c| c.candidate.id == CandidateId::new(1)));
        assert_eq!(home.candidates.len(), 2);
    }

    #[tokio::test]
    async fn party_view_sums_every_member() {
        let a = candidate(1, "A", "Blue", Sex::Male);
        let b = candidate(2, "B", "Blue", Sex::Female);
        let (store, reader) = seeded(&[]).await;
        CounterStore::increment(store.as_ref(), &keys::candidate_votes(a.id), 3)
            .await
            .unwrap();
        CounterStore::increment(store.as_ref(), &keys::candidate_votes(b.id), 4)
            .await
            .unwrap();
        store
            .increment_score(&keys::party_keywords("Blue"), "honest", 2)
            .await
            .unwrap();

        let page = reader.party("Blue", vec![&a, &b]).await.unwrap();
        assert_eq!(page.votes, 7);
        assert_eq!(page.keywords, vec!["honest".to_string()]);
        assert_eq!(page.candidates.len(), 2);
    }
}
