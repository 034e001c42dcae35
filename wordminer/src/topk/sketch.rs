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

//! Top-k sketch implementation.

use std::hash::Hash;

use crate::error::Error;
use crate::topk::stream_summary::Counter;
use crate::topk::stream_summary::StreamSummary;

/// Error guarantees for frequent item queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Include items if upper bound exceeds threshold (no false negatives).
    NoFalseNegatives,
    /// Include items if lower bound exceeds threshold (no false positives).
    NoFalsePositives,
}

/// A tracked item together with its approximate count.
///
/// The true frequency of the item lies in `[count - error, count]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SketchEntry<T> {
    item: T,
    count: u64,
    error: u64,
}

impl<T> SketchEntry<T> {
    /// Returns the item.
    pub fn item(&self) -> &T {
        &self.item
    }

    /// Consumes the entry and returns the item.
    pub fn into_item(self) -> T {
        self.item
    }

    /// Returns the approximate count. This never underestimates the true frequency.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the maximum overestimation of [`SketchEntry::count`].
    pub fn error(&self) -> u64 {
        self.error
    }

    /// Returns the guaranteed minimum true frequency, `count - error`.
    pub fn lower_bound(&self) -> u64 {
        self.count - self.error
    }

    /// Returns the upper bound for the true frequency, which is the count itself.
    pub fn upper_bound(&self) -> u64 {
        self.count
    }

    fn from_counter(counter: &Counter<T>) -> Self
    where
        T: Clone,
    {
        Self {
            item: counter.item.clone(),
            count: counter.count,
            error: counter.error,
        }
    }
}

/// Frozen view of all entries tracked by a [`TopKSketch`].
///
/// Entries are ordered by count descending; entries with equal counts keep the order in
/// which they entered the sketch. The view owns its data and can be iterated any number
/// of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<T> {
    entries: Vec<SketchEntry<T>>,
    maximum_error: u64,
    total_weight: u64,
}

impl<T> Snapshot<T> {
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the snapshot has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entries as a slice.
    pub fn entries(&self) -> &[SketchEntry<T>] {
        &self.entries
    }

    /// Returns an iterator over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, SketchEntry<T>> {
        self.entries.iter()
    }

    /// Returns the sketch maximum error at the time of the snapshot.
    pub fn maximum_error(&self) -> u64 {
        self.maximum_error
    }

    /// Returns the total stream weight at the time of the snapshot.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }
}

impl<'a, T> IntoIterator for &'a Snapshot<T> {
    type Item = &'a SketchEntry<T>;
    type IntoIter = std::slice::Iter<'a, SketchEntry<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Space-Saving top-k sketch for generic item types.
///
/// The sketch tracks at most `capacity` items. Tracked counts never underestimate the true
/// frequency, and overestimate it by at most the per-entry error.
///
/// See [`crate::topk`] for an overview and error guarantees.
#[derive(Debug, Clone)]
pub struct TopKSketch<T> {
    capacity: usize,
    stream_weight: u64,
    summary: StreamSummary<T>,
}

impl<T: Eq + Hash + Clone> TopKSketch<T> {
    /// Creates a new sketch tracking at most `capacity` items.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) error if
    /// `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::invalid_argument("capacity must be at least 1")
                .with_context("capacity", capacity));
        }
        Ok(Self {
            capacity,
            stream_weight: 0,
            summary: StreamSummary::with_capacity(capacity),
        })
    }

    /// Returns the maximum number of tracked items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if the sketch is empty.
    pub fn is_empty(&self) -> bool {
        self.summary.len() == 0
    }

    /// Returns true if the sketch tracks `capacity` items, so that new items evict old ones.
    pub fn is_full(&self) -> bool {
        self.summary.len() >= self.capacity
    }

    /// Returns the number of items being tracked.
    pub fn num_active_items(&self) -> usize {
        self.summary.len()
    }

    /// Returns the total weight of the stream.
    ///
    /// This is the sum of all counts passed to `update` and `update_with_count`.
    pub fn total_weight(&self) -> u64 {
        self.stream_weight
    }

    /// Returns the estimated frequency for an item, or zero if it is not tracked.
    pub fn estimate(&self, item: &T) -> u64 {
        self.summary.get(item).map_or(0, |counter| counter.count)
    }

    /// Returns the guaranteed lower bound frequency for an item.
    ///
    /// If the item is not tracked, the lower bound is zero.
    pub fn lower_bound(&self, item: &T) -> u64 {
        self.summary
            .get(item)
            .map_or(0, |counter| counter.count - counter.error)
    }

    /// Returns the guaranteed upper bound frequency for an item.
    ///
    /// If the item is not tracked this is [`TopKSketch::maximum_error`].
    pub fn upper_bound(&self, item: &T) -> u64 {
        self.summary
            .get(item)
            .map_or_else(|| self.maximum_error(), |counter| counter.count)
    }

    /// Returns an upper bound on the true frequency of any item that is not tracked.
    ///
    /// This is the smallest tracked count once the sketch is full, and zero before that.
    pub fn maximum_error(&self) -> u64 {
        if self.is_full() {
            self.summary.min().map_or(0, |counter| counter.count)
        } else {
            0
        }
    }

    /// Updates the sketch with a count of one.
    pub fn update(&mut self, item: T) {
        self.update_with_count(item, 1);
    }

    /// Updates the sketch with an item and count.
    ///
    /// A count of zero is a no-op.
    pub fn update_with_count(&mut self, item: T, count: u64) {
        if count == 0 {
            return;
        }
        self.stream_weight += count;
        if self.summary.increment(&item, count) {
            return;
        }
        if self.summary.len() < self.capacity {
            self.summary.push(item, count, 0);
        } else if self.summary.replace_min(item, count).is_err() {
            unreachable!("a full sketch with non-zero capacity has a minimum entry");
        }
    }

    /// Merges another sketch into this one.
    ///
    /// Items tracked by both sketches get their counts and errors summed. An item tracked by
    /// only one side also receives the other side's [`TopKSketch::maximum_error`] on both
    /// its count and its error, since it may have been evicted there. If more than
    /// `capacity` items result, the ones with the lowest counts are dropped.
    pub fn merge(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        let self_floor = self.maximum_error();
        let other_floor = other.maximum_error();

        let mut merged: Vec<(T, u64, u64)> =
            Vec::with_capacity(self.summary.len() + other.summary.len());
        for counter in self.summary.sorted() {
            let (count, error) = match other.summary.get(&counter.item) {
                Some(theirs) => (counter.count + theirs.count, counter.error + theirs.error),
                None => (counter.count + other_floor, counter.error + other_floor),
            };
            merged.push((counter.item.clone(), count, error));
        }
        for counter in other.summary.sorted() {
            if self.summary.get(&counter.item).is_none() {
                merged.push((
                    counter.item.clone(),
                    counter.count + self_floor,
                    counter.error + self_floor,
                ));
            }
        }
        merged.sort_by(|a, b| b.1.cmp(&a.1));
        merged.truncate(self.capacity);

        let mut summary = StreamSummary::with_capacity(self.capacity);
        for (item, count, error) in merged {
            summary.push(item, count, error);
        }
        self.summary = summary;
        self.stream_weight += other.stream_weight;
    }

    /// Resets the sketch to an empty state.
    pub fn reset(&mut self) {
        self.stream_weight = 0;
        self.summary = StreamSummary::with_capacity(self.capacity);
    }

    /// Freezes the current state into an immutable [`Snapshot`].
    pub fn snapshot(&self) -> Snapshot<T> {
        let entries = self
            .summary
            .sorted()
            .into_iter()
            .map(SketchEntry::from_counter)
            .collect();
        Snapshot {
            entries,
            maximum_error: self.maximum_error(),
            total_weight: self.stream_weight,
        }
    }

    /// Returns frequent items using the sketch maximum error as threshold.
    ///
    /// This is equivalent to `frequent_items_with_threshold(error_type, self.maximum_error())`.
    pub fn frequent_items(&self, error_type: ErrorType) -> Vec<SketchEntry<T>> {
        self.frequent_items_with_threshold(error_type, self.maximum_error())
    }

    /// Returns frequent items using a custom threshold.
    ///
    /// If `threshold` is less than `maximum_error`, `maximum_error` is used instead.
    ///
    /// For [`ErrorType::NoFalseNegatives`], items are included when `upper_bound > threshold`.
    /// For [`ErrorType::NoFalsePositives`], items are included when `lower_bound > threshold`.
    pub fn frequent_items_with_threshold(
        &self,
        error_type: ErrorType,
        threshold: u64,
    ) -> Vec<SketchEntry<T>> {
        let threshold = threshold.max(self.maximum_error());
        self.summary
            .sorted()
            .into_iter()
            .filter(|counter| match error_type {
                ErrorType::NoFalseNegatives => counter.count > threshold,
                ErrorType::NoFalsePositives => counter.count - counter.error > threshold,
            })
            .map(SketchEntry::from_counter)
            .collect()
    }
}
