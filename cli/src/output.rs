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

//! Result file formats.

use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use wordminer::ngram::NgramMode;
use wordminer::ngram::Phrase;
use wordminer::scoring::CandidateRecord;
use wordminer::topk::Snapshot;

const PATTERN_PLACEHOLDER: &str = "%s";

/// Expands the output pattern for one sketch dump, e.g. `output_%s.txt` to `output_suffix.txt`.
pub fn dump_path(pattern: &str, mode: NgramMode) -> PathBuf {
    PathBuf::from(pattern.replace(PATTERN_PLACEHOLDER, mode.name()))
}

/// Writes ranked candidates as tab-separated
/// `word, count, error, polymerization, flexibility, score` rows.
pub fn write_candidates<W: Write>(mut out: W, records: &[CandidateRecord]) -> io::Result<()> {
    for r in records {
        writeln!(
            out,
            "{}\t{}\t{}\t{:.6}\t{:.6}\t{:.6}",
            r.word(),
            r.count(),
            r.error(),
            r.polymerization(),
            r.flexibility(),
            r.score()
        )?;
    }
    out.flush()
}

/// Writes every tracked entry as a space-separated `key count error` row.
pub fn write_snapshot<W: Write>(mut out: W, snapshot: &Snapshot<Phrase>) -> io::Result<()> {
    for entry in snapshot {
        writeln!(out, "{} {} {}", entry.item(), entry.count(), entry.error())?;
    }
    out.flush()
}

pub fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use wordminer::miner::WordMiner;
    use wordminer::rank::RankOptions;
    use wordminer::rank::score_and_rank;

    use super::*;

    fn mine(lines: &[&str]) -> Snapshot<Phrase> {
        let mut miner = WordMiner::builder().capacity(16).build().unwrap();
        for line in lines {
            let tokens: Vec<&str> = line.split(' ').collect();
            miner.insert(tokens.as_slice(), 1);
        }
        miner.snapshot()
    }

    fn rows(bytes: Vec<u8>) -> Vec<String> {
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_dump_path() {
        assert_eq!(
            dump_path("output_%s.txt", NgramMode::Prefix),
            PathBuf::from("output_prefix.txt")
        );
        assert_eq!(
            dump_path("counts.txt", NgramMode::Suffix),
            PathBuf::from("counts.txt")
        );
    }

    #[test]
    fn test_write_candidates() {
        let snapshot = mine(&["a b c", "x b c", "y b c", "p a b", "q x b", "r y b"]);
        let ranked = score_and_rank(&snapshot, &RankOptions::default());
        let mut out = Vec::new();
        write_candidates(&mut out, &ranked).unwrap();
        insta::assert_debug_snapshot!(rows(out), @r#"
        [
            "b\t3\t0\t1.000000\t1.098612\t1.098612",
            "b c\t3\t0\t1.000000\t1.000000\t1.000000",
        ]
        "#);
    }

    #[test]
    fn test_write_snapshot() {
        let snapshot = mine(&["a b c", "x b c", "y b"]);
        let mut out = Vec::new();
        write_snapshot(&mut out, &snapshot).unwrap();
        insta::assert_debug_snapshot!(rows(out), @r#"
        [
            "b c 2 0",
            "c 2 0",
            "b 1 0",
        ]
        "#);
    }
}
