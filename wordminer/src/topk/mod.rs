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

//! Bounded-memory top-k sketch for finding heavy hitters in weighted streams.
//!
//! # Overview
//!
//! This sketch implements the Space-Saving algorithm from ["Efficient Computation of Frequent
//! and Top-k Elements in Data Streams"](https://doi.org/10.1007/978-3-540-30570-5_27) by
//! Ahmed Metwally, Divyakant Agrawal and Amr El Abbadi, on top of a stream-summary structure.
//!
//! The sketch tracks at most `K` items of any type `T: Eq + Hash + Clone`, each with a weighted
//! count. When a new item arrives while `K` items are already tracked, the item with the
//! smallest count is evicted and the newcomer inherits that count as its error.
//!
//! This implementation provides the following capabilities:
//! * Estimate the frequency of an item.
//! * Return upper and lower bounds of any item, such that the true frequency is always between
//!   the upper and lower bounds.
//! * Return a global maximum error that bounds the frequency of every untracked item.
//! * Return an array of frequent items that qualify either [`ErrorType::NoFalsePositives`] or
//!   [`ErrorType::NoFalseNegatives`].
//! * Merge itself with another sketch, so disjoint slices of a stream can be counted in
//!   parallel.
//! * Freeze its state into an immutable [`Snapshot`].
//!
//! # Accuracy
//!
//! For every tracked item, `count - error <= true frequency <= count`. If fewer than `K`
//! distinct items are inserted, all counts are exact. The error of any entry is at most
//! `W / K`, where `W` is the total stream weight, so the sketch is accurate on skewed
//! distributions where the heavy hitters dominate.
//!
//! Eviction is deterministic: among entries sharing the minimum count, the one that entered
//! the sketch earliest is evicted. Feeding the same stream twice gives the same sketch.
//!
//! # Examples
//!
//! ```
//! # use wordminer::topk::ErrorType;
//! # use wordminer::topk::TopKSketch;
//! let mut sketch = TopKSketch::<&str>::new(2).unwrap();
//! sketch.update_with_count("a", 3);
//! sketch.update("b");
//! sketch.update("c");
//!
//! // "b" was evicted; "c" inherited its count as error.
//! assert_eq!(sketch.estimate(&"c"), 2);
//! assert_eq!(sketch.lower_bound(&"c"), 1);
//!
//! let rows = sketch.frequent_items(ErrorType::NoFalsePositives);
//! assert_eq!(*rows[0].item(), "a");
//! ```
//!
//! # Merging
//!
//! ```
//! # use wordminer::topk::TopKSketch;
//! let mut left = TopKSketch::new(8).unwrap();
//! let mut right = TopKSketch::new(8).unwrap();
//! left.update_with_count(42, 2);
//! right.update_with_count(42, 5);
//!
//! left.merge(&right);
//! assert_eq!(left.estimate(&42), 7);
//! ```

mod sketch;
mod stream_summary;

pub use self::sketch::ErrorType;
pub use self::sketch::SketchEntry;
pub use self::sketch::Snapshot;
pub use self::sketch::TopKSketch;
