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

//! Unsupervised discovery of multi-token words in corpora too large to count exactly.
//!
//! The pipeline has four stages:
//!
//! 1. [`ngram`] expands every tokenized line into candidate [`Phrase`](ngram::Phrase)s.
//! 2. [`miner`] counts them with a bounded-memory [`TopKSketch`](topk::TopKSketch), possibly
//!    over several shards in parallel, and freezes the result into a
//!    [`Snapshot`](topk::Snapshot).
//! 3. [`scoring`] derives cohesion (polymerization) and branching entropy (flexibility) for
//!    every tracked phrase.
//! 4. [`rank`] combines the two into a score, filters and sorts.
//!
//! ```
//! use wordminer::miner::WordMiner;
//! use wordminer::rank::RankOptions;
//! use wordminer::rank::score_and_rank;
//!
//! let mut miner = WordMiner::builder().capacity(64).build().unwrap();
//! for line in ["p a b", "q x b", "r y b"] {
//!     let tokens: Vec<&str> = line.split(' ').collect();
//!     miner.insert(tokens.as_slice(), 1);
//! }
//! let ranked = score_and_rank(&miner.snapshot(), &RankOptions::default());
//! assert_eq!(ranked[0].word(), "b");
//! assert!((ranked[0].flexibility() - 3f64.ln()).abs() < 1e-9);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod error;
pub mod miner;
pub mod ngram;
pub mod rank;
pub mod scoring;
pub mod topk;
