// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Cohesion and branching entropy scores over a frozen snapshot.
//!
//! Two tables are derived once from a [`Snapshot`]:
//!
//! - a [`CountTable`] mapping every tracked phrase to its count, and
//! - a [`NeighborIndex`] mapping every tail (a phrase with its leading token removed) to the
//!   distribution of leading tokens observed in front of it.
//!
//! *Polymerization* compares a phrase's count with its tail's count: values near 1 mean the
//! tail almost always comes with this leading token. *Flexibility* is the Shannon entropy of
//! the heads preceding a phrase: high values mean the phrase appears after many different
//! tokens, which is what a free-standing word looks like.
//!
//! Every missing lookup has a neutral default of 1.0, so scoring never fails.

use std::collections::BTreeMap;
use std::collections::HashMap;

use rayon::prelude::*;

use crate::ngram::Phrase;
use crate::topk::SketchEntry;
use crate::topk::Snapshot;

/// Score used when no meaningful comparison is possible.
pub const NEUTRAL_SCORE: f64 = 1.0;

/// Direct lookup from tracked phrase to its count.
#[derive(Debug, Clone, Default)]
pub struct CountTable {
    counts: HashMap<Phrase, u64>,
}

impl CountTable {
    /// Builds the table from all entries of a snapshot.
    pub fn from_snapshot(snapshot: &Snapshot<Phrase>) -> Self {
        let counts = snapshot
            .iter()
            .map(|entry| (entry.item().clone(), entry.count()))
            .collect();
        Self { counts }
    }

    /// Returns the count for `phrase`, or zero if it is not tracked.
    pub fn get(&self, phrase: &Phrase) -> u64 {
        self.counts.get(phrase).copied().unwrap_or(0)
    }

    /// Returns the number of phrases in the table.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// For every tail, the aggregated counts of the heads seen in front of it.
///
/// Heads are kept in key order so entropy is summed in the same order on every run.
#[derive(Debug, Clone, Default)]
pub struct NeighborIndex {
    heads: HashMap<Phrase, BTreeMap<String, u64>>,
}

impl NeighborIndex {
    /// Builds the index from all multi-token entries of a snapshot.
    pub fn from_snapshot(snapshot: &Snapshot<Phrase>) -> Self {
        let mut heads: HashMap<Phrase, BTreeMap<String, u64>> = HashMap::new();
        for entry in snapshot {
            let phrase = entry.item();
            let (Some(head), Some(tail)) = (phrase.head(), phrase.tail()) else {
                continue;
            };
            *heads
                .entry(tail)
                .or_default()
                .entry(head.to_string())
                .or_default() += entry.count();
        }
        Self { heads }
    }

    /// Returns the head distribution observed in front of `tail`.
    pub fn neighbors(&self, tail: &Phrase) -> Option<&BTreeMap<String, u64>> {
        self.heads.get(tail)
    }

    /// Returns the number of distinct tails.
    pub fn len(&self) -> usize {
        self.heads.len()
    }

    /// Returns true if no tail has been indexed.
    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }
}

/// Shannon entropy (natural log) of the distribution given by `counts`.
///
/// Zero counts contribute nothing. An empty distribution, or one whose total is zero,
/// yields [`NEUTRAL_SCORE`].
pub fn entropy<I>(counts: I) -> f64
where
    I: IntoIterator<Item = u64>,
{
    let counts: Vec<u64> = counts.into_iter().collect();
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return NEUTRAL_SCORE;
    }
    let total = total as f64;
    let mut e = 0.0;
    for &count in &counts {
        if count != 0 {
            let p = count as f64 / total;
            e -= p * p.ln();
        }
    }
    e
}

/// Ratio of the count of `phrase` to the count of its tail.
///
/// Single-token phrases and phrases whose tail is not tracked score [`NEUTRAL_SCORE`].
pub fn polymerization(counts: &CountTable, phrase: &Phrase) -> f64 {
    let Some(tail) = phrase.tail() else {
        return NEUTRAL_SCORE;
    };
    let short = counts.get(&tail);
    if short == 0 {
        return NEUTRAL_SCORE;
    }
    counts.get(phrase) as f64 / short as f64
}

/// Branching entropy of the heads seen in front of `phrase`.
///
/// Phrases that never appear as a tail score [`NEUTRAL_SCORE`].
pub fn flexibility(neighbors: &NeighborIndex, phrase: &Phrase) -> f64 {
    match neighbors.neighbors(phrase) {
        Some(heads) => entropy(heads.values().copied()),
        None => NEUTRAL_SCORE,
    }
}

/// A scored candidate derived from one snapshot entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    phrase: Phrase,
    count: u64,
    error: u64,
    polymerization: f64,
    flexibility: f64,
    score: f64,
}

impl CandidateRecord {
    /// Creates a record; the score is `flexibility * polymerization`.
    pub fn new(
        phrase: Phrase,
        count: u64,
        error: u64,
        polymerization: f64,
        flexibility: f64,
    ) -> Self {
        Self {
            phrase,
            count,
            error,
            polymerization,
            flexibility,
            score: flexibility * polymerization,
        }
    }

    /// Returns the candidate phrase.
    pub fn phrase(&self) -> &Phrase {
        &self.phrase
    }

    /// Returns the canonical key of the candidate.
    pub fn word(&self) -> &str {
        self.phrase.key()
    }

    /// Returns the approximate count.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the maximum overestimation of the count.
    pub fn error(&self) -> u64 {
        self.error
    }

    /// Returns the guaranteed minimum true frequency, `count - error`.
    pub fn support(&self) -> u64 {
        self.count.saturating_sub(self.error)
    }

    /// Returns the cohesion score.
    pub fn polymerization(&self) -> f64 {
        self.polymerization
    }

    /// Returns the branching entropy score.
    pub fn flexibility(&self) -> f64 {
        self.flexibility
    }

    /// Returns `flexibility * polymerization`.
    pub fn score(&self) -> f64 {
        self.score
    }
}

/// Scores every entry of a frozen snapshot.
///
/// The derived tables are built once in [`Scorer::new`] and only read afterwards, so
/// candidates are scored in parallel.
#[derive(Debug)]
pub struct Scorer<'a> {
    snapshot: &'a Snapshot<Phrase>,
    counts: CountTable,
    neighbors: NeighborIndex,
}

impl<'a> Scorer<'a> {
    /// Builds the count table and the neighbor index for `snapshot`.
    pub fn new(snapshot: &'a Snapshot<Phrase>) -> Self {
        let counts = CountTable::from_snapshot(snapshot);
        let neighbors = NeighborIndex::from_snapshot(snapshot);
        tracing::debug!(
            entries = snapshot.len(),
            tails = neighbors.len(),
            "built scoring tables"
        );
        Self {
            snapshot,
            counts,
            neighbors,
        }
    }

    /// Returns the direct-count table.
    pub fn counts(&self) -> &CountTable {
        &self.counts
    }

    /// Returns the neighbor index.
    pub fn neighbors(&self) -> &NeighborIndex {
        &self.neighbors
    }

    /// Scores a single snapshot entry.
    pub fn record(&self, entry: &SketchEntry<Phrase>) -> CandidateRecord {
        let phrase = entry.item();
        let polymerization = polymerization(&self.counts, phrase);
        let flexibility = flexibility(&self.neighbors, phrase);
        CandidateRecord::new(
            phrase.clone(),
            entry.count(),
            entry.error(),
            polymerization,
            flexibility,
        )
    }

    /// Scores all snapshot entries, in snapshot order.
    pub fn score(&self) -> Vec<CandidateRecord> {
        self.snapshot
            .entries()
            .par_iter()
            .map(|entry| self.record(entry))
            .collect()
    }
}

/// Scores all entries of `snapshot`, in snapshot order. No filtering is applied.
pub fn score(snapshot: &Snapshot<Phrase>) -> Vec<CandidateRecord> {
    Scorer::new(snapshot).score()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_of_uniform_distribution() {
        let e = entropy([1, 1, 1]);
        assert!((e - 3f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_entropy_of_single_outcome_is_zero() {
        assert_eq!(entropy([5]), 0.0);
    }

    #[test]
    fn test_entropy_degenerate_inputs_are_neutral() {
        assert_eq!(entropy(std::iter::empty()), NEUTRAL_SCORE);
        assert_eq!(entropy([0, 0]), NEUTRAL_SCORE);
    }

    #[test]
    fn test_entropy_ignores_zero_terms() {
        assert_eq!(entropy([0, 4, 4, 0]), entropy([4, 4]));
    }
}
