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

mod corpus;
mod output;
mod tokenize;

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use wordminer::miner::DEFAULT_CAPACITY;
use wordminer::miner::MinerConfig;
use wordminer::miner::ShardedMiner;
use wordminer::miner::WeightedLine;
use wordminer::miner::WordMiner;
use wordminer::ngram::NgramMode;
use wordminer::rank::DEFAULT_SCORE_FLOOR;
use wordminer::rank::RankOptions;
use wordminer::rank::score_and_rank;

const PROGRESS_EVERY: u64 = 100_000;
const BATCH_LINES: usize = 100_000;
/// Value of a bare `--min-support`, the default minimum support of the library.
const BARE_MIN_SUPPORT: &str = "10";

/// Mine candidate words from a corpus with one text per line.
#[derive(Debug, Parser)]
#[command(name = "wordminer", version, about)]
struct Args {
    /// Input corpus; files ending in `.gz` are decompressed.
    #[arg(short = 'i', long, default_value = "input.txt.gz")]
    input: PathBuf,

    /// Maximum number of n-grams tracked per sketch.
    #[arg(short = 'n', long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Read a repetition count from the second column of each line.
    #[arg(short = 'c', long)]
    use_weight_column: bool,

    /// Pattern for the sketch dumps; `%s` becomes `prefix` or `suffix`.
    #[arg(short = 'o', long, default_value = "output_%s.txt")]
    output_pattern: String,

    /// Where to write the ranked candidates.
    #[arg(short = 's', long, default_value = "candidates.tsv")]
    scores: PathBuf,

    /// Drop candidates whose guaranteed count is below this; bare flag means 10.
    #[arg(long, num_args = 0..=1, default_missing_value = BARE_MIN_SUPPORT)]
    min_support: Option<u64>,

    /// Drop candidates scoring below this.
    #[arg(long, default_value_t = DEFAULT_SCORE_FLOOR, value_parser = parse_score_floor)]
    score_floor: f64,

    /// Count the corpus in this many parallel shards.
    #[arg(short = 'j', long, default_value_t = 1)]
    shards: usize,
}

fn parse_score_floor(value: &str) -> Result<f64, String> {
    let floor: f64 = value.parse().map_err(|err| format!("{err}"))?;
    if floor.is_finite() {
        Ok(floor)
    } else {
        Err(format!("score floor must be a finite number, got {value}"))
    }
}

impl Args {
    fn config(&self, mode: NgramMode) -> MinerConfig {
        MinerConfig {
            capacity: self.capacity,
            mode,
        }
    }

    fn rank_options(&self) -> RankOptions {
        RankOptions::default()
            .with_score_floor(self.score_floor)
            .with_min_support(self.min_support)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::info!(
        input = %args.input.display(),
        capacity = args.capacity,
        shards = args.shards,
        "mining corpus"
    );

    let (prefix, suffix) = if args.shards > 1 {
        count_sharded(&args)?
    } else {
        count_streaming(&args)?
    };

    for miner in [&prefix, &suffix] {
        let path = output::dump_path(&args.output_pattern, miner.config().mode);
        let snapshot = miner.snapshot();
        output::write_snapshot(output::create(&path)?, &snapshot)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            entries = snapshot.len(),
            maximum_error = snapshot.maximum_error(),
            "wrote sketch"
        );
    }

    let ranked = score_and_rank(&suffix.snapshot(), &args.rank_options());
    output::write_candidates(output::create(&args.scores)?, &ranked)
        .with_context(|| format!("failed to write {}", args.scores.display()))?;
    tracing::info!(
        path = %args.scores.display(),
        candidates = ranked.len(),
        "wrote candidates"
    );
    Ok(())
}

/// Counts prefixes and suffixes line by line, without holding the corpus in memory.
fn count_streaming(args: &Args) -> anyhow::Result<(WordMiner, WordMiner)> {
    let mut prefix = WordMiner::new(args.config(NgramMode::Prefix))?;
    let mut suffix = WordMiner::new(args.config(NgramMode::Suffix))?;
    let reader = corpus::open(&args.input)?;
    for line in reader.lines() {
        let line = line.with_context(|| format!("failed to read {}", args.input.display()))?;
        let Some(line) = corpus::to_weighted_line(&line, args.use_weight_column) else {
            continue;
        };
        prefix.insert_line(&line);
        suffix.insert_line(&line);
        if suffix.lines() % PROGRESS_EVERY == 0 {
            tracing::info!(lines = suffix.lines(), "progress");
        }
    }
    tracing::info!(lines = suffix.lines(), "done counting");
    Ok((prefix, suffix))
}

/// Counts the corpus in batches, each spread over `args.shards` parallel shards.
fn count_sharded(args: &Args) -> anyhow::Result<(WordMiner, WordMiner)> {
    let mut prefix = ShardedMiner::new(args.config(NgramMode::Prefix), args.shards)?;
    let mut suffix = ShardedMiner::new(args.config(NgramMode::Suffix), args.shards)?;
    let reader = corpus::open(&args.input)?;
    let mut batch: Vec<WeightedLine> = Vec::with_capacity(BATCH_LINES);
    for line in reader.lines() {
        let line = line.with_context(|| format!("failed to read {}", args.input.display()))?;
        batch.extend(corpus::to_weighted_line(&line, args.use_weight_column));
        if batch.len() == BATCH_LINES {
            prefix.insert_batch(&batch);
            suffix.insert_batch(&batch);
            batch.clear();
            tracing::info!(lines = suffix.lines(), "progress");
        }
    }
    prefix.insert_batch(&batch);
    suffix.insert_batch(&batch);
    tracing::info!(lines = suffix.lines(), "done counting");
    Ok((prefix.finish()?, suffix.finish()?))
}

#[cfg(test)]
mod tests {
    use wordminer::ngram::Phrase;
    use wordminer::rank::DEFAULT_MIN_SUPPORT;
    use wordminer::topk::Snapshot;

    use super::*;

    fn rows(snapshot: &Snapshot<Phrase>) -> Vec<(String, u64, u64)> {
        let mut rows: Vec<_> = snapshot
            .iter()
            .map(|e| (e.item().key().to_string(), e.count(), e.error()))
            .collect();
        rows.sort();
        rows
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["wordminer"]);
        assert_eq!(args.capacity, DEFAULT_CAPACITY);
        assert_eq!(args.min_support, None);
        assert_eq!(args.rank_options(), RankOptions::default());
        assert_eq!(args.shards, 1);
    }

    #[test]
    fn test_bare_min_support_flag() {
        let args = Args::parse_from(["wordminer", "--min-support"]);
        assert_eq!(args.rank_options(), RankOptions::strict());

        let args = Args::parse_from(["wordminer", "--min-support", "3", "-c", "-n", "50"]);
        assert_eq!(args.min_support, Some(3));
        assert!(args.use_weight_column);
        assert_eq!(args.config(NgramMode::Prefix).capacity, 50);

        assert_eq!(BARE_MIN_SUPPORT.parse::<u64>(), Ok(DEFAULT_MIN_SUPPORT));
    }

    #[test]
    fn test_score_floor_must_be_finite() {
        let args = Args::parse_from(["wordminer", "--score-floor", "0.5"]);
        assert_eq!(args.score_floor, 0.5);
        for bad in ["NaN", "inf", "high"] {
            assert!(Args::try_parse_from(["wordminer", "--score-floor", bad]).is_err());
        }
    }

    #[test]
    fn test_sharded_counting_matches_streaming() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("corpus.txt");
        let corpus: String = (0..300)
            .map(|i| format!("北京大学{} {}\n", i % 7, i % 3 + 1))
            .collect();
        std::fs::write(&input, corpus).unwrap();

        let input = input.to_str().unwrap();
        let streaming = Args::parse_from(["wordminer", "-i", input, "-c"]);
        let sharded = Args::parse_from(["wordminer", "-i", input, "-c", "-j", "4"]);
        let (prefix, suffix) = count_streaming(&streaming).unwrap();
        let (sharded_prefix, sharded_suffix) = count_sharded(&sharded).unwrap();

        assert_eq!(sharded_suffix.lines(), 300);
        assert_eq!(rows(&sharded_prefix.snapshot()), rows(&prefix.snapshot()));
        assert_eq!(rows(&sharded_suffix.snapshot()), rows(&suffix.snapshot()));
        assert_eq!(sharded_suffix.sketch().total_weight(), suffix.sketch().total_weight());
    }
}
