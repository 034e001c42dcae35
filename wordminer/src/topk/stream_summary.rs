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

//! Stream summary for generic items.
//!
//! Counters live in a slab addressed by slot. A hash index maps items to slots, and an
//! ordered set of `(count, seq, slot)` keeps the smallest counter at the front so that the
//! eviction victim is found in `O(log K)`. Every counter receives a fresh sequence number
//! when it enters the summary; among counters with equal counts the lowest sequence number
//! (the longest-resident counter) is evicted first.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::hash::Hash;

const MAX_PREALLOCATED_SLOTS: usize = 1 << 16;

/// A tracked item with its approximate count and overestimation bound.
#[derive(Debug, Clone)]
pub(super) struct Counter<T> {
    pub item: T,
    pub count: u64,
    pub error: u64,
    pub seq: u64,
}

#[derive(Debug, Clone)]
pub(super) struct StreamSummary<T> {
    slots: Vec<Counter<T>>,
    index: HashMap<T, usize>,
    order: BTreeSet<(u64, u64, usize)>,
    next_seq: u64,
}

impl<T: Eq + Hash + Clone> StreamSummary<T> {
    /// Creates an empty summary expecting up to `capacity` counters.
    pub fn with_capacity(capacity: usize) -> Self {
        let hint = capacity.min(MAX_PREALLOCATED_SLOTS);
        Self {
            slots: Vec::with_capacity(hint),
            index: HashMap::with_capacity(hint),
            order: BTreeSet::new(),
            next_seq: 0,
        }
    }

    /// Returns the number of tracked counters.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns the counter for `item`, if tracked.
    pub fn get(&self, item: &T) -> Option<&Counter<T>> {
        self.index.get(item).map(|&slot| &self.slots[slot])
    }

    /// Returns the counter that would be evicted next.
    pub fn min(&self) -> Option<&Counter<T>> {
        self.order
            .first()
            .map(|&(_, _, slot)| &self.slots[slot])
    }

    /// Adds `amount` to the counter of `item`.
    ///
    /// Returns false if `item` is not tracked, leaving the summary untouched.
    pub fn increment(&mut self, item: &T, amount: u64) -> bool {
        let Some(&slot) = self.index.get(item) else {
            return false;
        };
        let counter = &mut self.slots[slot];
        self.order.remove(&(counter.count, counter.seq, slot));
        counter.count += amount;
        self.order.insert((counter.count, counter.seq, slot));
        true
    }

    /// Appends a new counter. The caller guarantees `item` is not already tracked.
    pub fn push(&mut self, item: T, count: u64, error: u64) {
        debug_assert!(!self.index.contains_key(&item), "item already tracked");
        let slot = self.slots.len();
        let seq = self.take_seq();
        self.index.insert(item.clone(), slot);
        self.order.insert((count, seq, slot));
        self.slots.push(Counter {
            item,
            count,
            error,
            seq,
        });
    }

    /// Evicts the minimum counter and reuses its slot for `item`.
    ///
    /// The new counter starts at `min.count + amount` with error `min.count`. Returns the
    /// evicted item, or gives `item` back if the summary is empty.
    pub fn replace_min(&mut self, item: T, amount: u64) -> Result<T, T> {
        let Some((min_count, _, slot)) = self.order.pop_first() else {
            return Err(item);
        };
        let seq = self.take_seq();
        let count = min_count + amount;
        let evicted = std::mem::replace(
            &mut self.slots[slot],
            Counter {
                item: item.clone(),
                count,
                error: min_count,
                seq,
            },
        );
        self.index.remove(&evicted.item);
        self.index.insert(item, slot);
        self.order.insert((count, seq, slot));
        Ok(evicted.item)
    }

    /// Returns counters ordered by count descending, then by sequence number ascending.
    pub fn sorted(&self) -> Vec<&Counter<T>> {
        let mut counters: Vec<&Counter<T>> = self.slots.iter().collect();
        counters.sort_by(|a, b| b.count.cmp(&a.count).then(a.seq.cmp(&b.seq)));
        counters
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
