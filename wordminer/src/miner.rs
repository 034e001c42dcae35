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

//! The ingestion side of the pipeline: token lines in, frozen snapshot out.

use rayon::prelude::*;

use crate::error::Error;
use crate::ngram::NgramMode;
use crate::ngram::Phrase;
use crate::ngram::ngrams;
use crate::topk::Snapshot;
use crate::topk::TopKSketch;

/// Default number of phrases tracked by a miner.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Configuration of a [`WordMiner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinerConfig {
    /// Maximum number of phrases tracked at once. Must be at least 1.
    pub capacity: usize,
    /// Which n-grams of each line are counted.
    pub mode: NgramMode,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            mode: NgramMode::default(),
        }
    }
}

/// One tokenized corpus line and the number of times it occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedLine {
    /// Normalized tokens of the line.
    pub tokens: Vec<String>,
    /// Repetition count of the line.
    pub weight: u64,
}

impl WeightedLine {
    /// Creates a line with weight 1.
    pub fn new(tokens: Vec<String>) -> Self {
        Self::with_weight(tokens, 1)
    }

    /// Creates a line with the given weight.
    pub fn with_weight(tokens: Vec<String>, weight: u64) -> Self {
        Self { tokens, weight }
    }
}

/// Counts candidate phrases of a corpus in bounded memory.
///
/// # Examples
///
/// ```
/// # use wordminer::miner::WordMiner;
/// # use wordminer::ngram::NgramMode;
/// let mut miner = WordMiner::builder()
///     .capacity(16)
///     .mode(NgramMode::Suffix)
///     .build()
///     .unwrap();
/// for line in ["a b c", "x b c", "y b c"] {
///     let tokens: Vec<&str> = line.split(' ').collect();
///     miner.insert(tokens.as_slice(), 1);
/// }
/// let snapshot = miner.snapshot();
/// assert_eq!(snapshot.entries()[0].item().key(), "b c");
/// assert_eq!(snapshot.entries()[0].count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct WordMiner {
    config: MinerConfig,
    lines: u64,
    sketch: TopKSketch<Phrase>,
}

impl WordMiner {
    /// Creates a new builder for WordMiner.
    pub fn builder() -> WordMinerBuilder {
        WordMinerBuilder::default()
    }

    /// Creates a miner from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) error if the
    /// capacity is zero.
    pub fn new(config: MinerConfig) -> Result<Self, Error> {
        let sketch = TopKSketch::new(config.capacity)?;
        Ok(Self {
            config,
            lines: 0,
            sketch,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> MinerConfig {
        self.config
    }

    /// Returns the number of lines inserted so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Returns the underlying sketch.
    pub fn sketch(&self) -> &TopKSketch<Phrase> {
        &self.sketch
    }

    /// Counts the n-grams of one line, each with `weight`.
    ///
    /// Lines with fewer than two tokens and zero weights change nothing but the line count.
    pub fn insert<S: AsRef<str>>(&mut self, tokens: &[S], weight: u64) {
        self.lines += 1;
        for phrase in ngrams(tokens, self.config.mode) {
            self.sketch.update_with_count(phrase, weight);
        }
    }

    /// Inserts a [`WeightedLine`].
    pub fn insert_line(&mut self, line: &WeightedLine) {
        self.insert(line.tokens.as_slice(), line.weight);
    }

    /// Merges the counts of another miner into this one.
    ///
    /// # Errors
    ///
    /// Returns an [`Incompatible`](crate::error::ErrorKind::Incompatible) error if the miners
    /// count different kinds of n-grams or have different capacities.
    pub fn merge(&mut self, other: &WordMiner) -> Result<(), Error> {
        if self.config.mode != other.config.mode {
            return Err(Error::incompatible("cannot merge miners with different modes")
                .with_context("self", self.config.mode)
                .with_context("other", other.config.mode));
        }
        if self.config.capacity != other.config.capacity {
            return Err(
                Error::incompatible("cannot merge miners with different capacities")
                    .with_context("self", self.config.capacity)
                    .with_context("other", other.config.capacity),
            );
        }
        self.sketch.merge(&other.sketch);
        self.lines += other.lines;
        tracing::debug!(
            lines = self.lines,
            active = self.sketch.num_active_items(),
            "merged miner"
        );
        Ok(())
    }

    /// Freezes the tracked phrases into an immutable snapshot.
    pub fn snapshot(&self) -> Snapshot<Phrase> {
        self.sketch.snapshot()
    }
}

/// Builder for WordMiner.
#[derive(Debug, Default)]
pub struct WordMinerBuilder {
    config: MinerConfig,
}

impl WordMinerBuilder {
    /// Set the maximum number of tracked phrases.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Set the n-gram mode.
    pub fn mode(mut self, mode: NgramMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Build the WordMiner.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity is zero.
    pub fn build(self) -> Result<WordMiner, Error> {
        WordMiner::new(self.config)
    }
}

/// A fixed set of miners fed with batches of lines in parallel.
///
/// Every batch is cut into contiguous slices, one per shard, and each shard counts its
/// slice on its own thread. Only one batch needs to be held in memory at a time. The
/// shards are merged in order by [`ShardedMiner::finish`], so the result only depends on
/// the input, the batch boundaries and the shard count.
#[derive(Debug, Clone)]
pub struct ShardedMiner {
    config: MinerConfig,
    miners: Vec<WordMiner>,
}

impl ShardedMiner {
    /// Creates `shards` empty miners sharing `config`.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) error if
    /// `shards` or the configured capacity is zero.
    pub fn new(config: MinerConfig, shards: usize) -> Result<Self, Error> {
        if shards == 0 {
            return Err(Error::invalid_argument("shard count must be at least 1")
                .with_context("shards", shards));
        }
        let miners = (0..shards)
            .map(|_| WordMiner::new(config))
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Self { config, miners })
    }

    /// Returns the configuration shared by all shards.
    pub fn config(&self) -> MinerConfig {
        self.config
    }

    /// Returns the number of shards.
    pub fn shards(&self) -> usize {
        self.miners.len()
    }

    /// Returns the number of lines inserted so far, over all shards.
    pub fn lines(&self) -> u64 {
        self.miners.iter().map(WordMiner::lines).sum()
    }

    /// Counts one batch of lines, splitting it evenly over the shards.
    pub fn insert_batch(&mut self, lines: &[WeightedLine]) {
        if lines.is_empty() {
            return;
        }
        let chunk_size = lines.len().div_ceil(self.miners.len());
        self.miners
            .par_iter_mut()
            .zip(lines.par_chunks(chunk_size))
            .for_each(|(miner, chunk)| {
                for line in chunk {
                    miner.insert_line(line);
                }
            });
    }

    /// Merges the shards, in shard order, into a single miner.
    pub fn finish(self) -> Result<WordMiner, Error> {
        let shards = self.miners.len();
        let mut miners = self.miners.into_iter();
        let Some(mut merged) = miners.next() else {
            return WordMiner::new(self.config);
        };
        for miner in miners {
            merged.merge(&miner)?;
        }
        tracing::debug!(shards, lines = merged.lines(), "merged shards");
        Ok(merged)
    }
}

/// Counts `lines` in parallel over `shards` contiguous slices and merges the results.
///
/// This is a [`ShardedMiner`] fed with a single batch.
///
/// # Errors
///
/// Returns an [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) error if
/// `shards` or the configured capacity is zero.
pub fn ingest_sharded(
    config: MinerConfig,
    lines: &[WeightedLine],
    shards: usize,
) -> Result<WordMiner, Error> {
    let mut miner = ShardedMiner::new(config, shards)?;
    miner.insert_batch(lines);
    miner.finish()
}
