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

//! Ranking and filtering of scored candidates.

use crate::ngram::Phrase;
use crate::scoring::CandidateRecord;
use crate::scoring::Scorer;
use crate::topk::Snapshot;

/// Default lowest score a candidate may have and still be reported.
pub const DEFAULT_SCORE_FLOOR: f64 = 1.0;

/// Minimum support used by [`RankOptions::strict`].
pub const DEFAULT_MIN_SUPPORT: u64 = 10;

/// Thresholds applied when ranking candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankOptions {
    /// Candidates with `score < score_floor` are dropped. A score equal to the floor is kept.
    pub score_floor: f64,
    /// Candidates whose guaranteed frequency `count - error` is below this value are dropped.
    /// `None` disables the check.
    pub min_support: Option<u64>,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            score_floor: DEFAULT_SCORE_FLOOR,
            min_support: None,
        }
    }
}

impl RankOptions {
    /// Options that also drop low-confidence candidates, using [`DEFAULT_MIN_SUPPORT`].
    pub fn strict() -> Self {
        Self {
            min_support: Some(DEFAULT_MIN_SUPPORT),
            ..Self::default()
        }
    }

    /// Sets the score floor.
    pub fn with_score_floor(mut self, score_floor: f64) -> Self {
        self.score_floor = score_floor;
        self
    }

    /// Sets or clears the minimum support.
    pub fn with_min_support(mut self, min_support: Option<u64>) -> Self {
        self.min_support = min_support;
        self
    }

    /// Returns true if `record` passes both thresholds.
    pub fn accepts(&self, record: &CandidateRecord) -> bool {
        if record.score() < self.score_floor {
            return false;
        }
        match self.min_support {
            Some(min_support) => record.support() >= min_support,
            None => true,
        }
    }
}

/// Filters `records` and sorts them by score, highest first.
///
/// The sort is stable: candidates with equal scores keep their input order, which for
/// records produced by [`crate::scoring::score`] is the snapshot order.
pub fn rank(records: Vec<CandidateRecord>, options: &RankOptions) -> Vec<CandidateRecord> {
    let mut ranked: Vec<CandidateRecord> = records
        .into_iter()
        .filter(|record| options.accepts(record))
        .collect();
    ranked.sort_by(|a, b| b.score().total_cmp(&a.score()));
    ranked
}

/// Scores every entry of `snapshot` and ranks the result.
pub fn score_and_rank(snapshot: &Snapshot<Phrase>, options: &RankOptions) -> Vec<CandidateRecord> {
    let records = Scorer::new(snapshot).score();
    let scored = records.len();
    let ranked = rank(records, options);
    tracing::debug!(scored, kept = ranked.len(), "ranked candidates");
    ranked
}
