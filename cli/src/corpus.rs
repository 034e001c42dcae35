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

//! Reading corpus files, plain or gzip-compressed.

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use flate2::read::MultiGzDecoder;
use wordminer::miner::WeightedLine;

use crate::tokenize::tokenize;

/// Opens `path` for line reading, decompressing it if the name ends in `.gz`.
pub fn open(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let gzipped = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if gzipped {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Splits a corpus line into its text field and weight.
///
/// The text is the first whitespace-separated field. With `use_weight_column` the second
/// field is the weight; a missing or malformed weight counts as 1. Blank lines give `None`.
pub fn parse_line(line: &str, use_weight_column: bool) -> Option<(&str, u64)> {
    let mut fields = line.split_whitespace();
    let text = fields.next()?;
    let mut weight = 1;
    if use_weight_column {
        if let Some(field) = fields.next() {
            match field.parse::<u64>() {
                Ok(n) => weight = n,
                Err(err) => tracing::debug!(field, %err, "ignoring malformed weight"),
            }
        }
    }
    Some((text, weight))
}

/// Parses and tokenizes one raw corpus line.
pub fn to_weighted_line(line: &str, use_weight_column: bool) -> Option<WeightedLine> {
    let (text, weight) = parse_line(line, use_weight_column)?;
    Some(WeightedLine::with_weight(tokenize(text), weight))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    fn read_all(path: &Path) -> Vec<WeightedLine> {
        open(path)
            .unwrap()
            .lines()
            .filter_map(|line| to_weighted_line(&line.unwrap(), true))
            .collect()
    }

    #[test]
    fn test_parse_line_without_weights() {
        assert_eq!(parse_line("  北京大学 7\n", false), Some(("北京大学", 1)));
        assert_eq!(parse_line("   ", false), None);
    }

    #[test]
    fn test_parse_line_with_weights() {
        assert_eq!(parse_line("abc 7", true), Some(("abc", 7)));
        assert_eq!(parse_line("abc", true), Some(("abc", 1)));
        assert_eq!(parse_line("abc -3", true), Some(("abc", 1)));
        assert_eq!(parse_line("abc x", true), Some(("abc", 1)));
    }

    #[test]
    fn test_to_weighted_line() {
        let line = to_weighted_line("New York\t3", true).unwrap();
        assert_eq!(line.tokens, vec!["new"]);
        assert_eq!(line.weight, 1);

        let line = to_weighted_line("纽约市\t3", true).unwrap();
        assert_eq!(line.tokens, vec!["纽", "约", "市"]);
        assert_eq!(line.weight, 3);
    }

    #[test]
    fn test_open_decompresses_gzip_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.txt.GZ");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all("北京 4\n\nhello world 2\n".as_bytes()).unwrap();
        encoder.finish().unwrap();

        let lines = read_all(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], WeightedLine::with_weight(vec!["北".into(), "京".into()], 4));
        assert_eq!(lines[1], WeightedLine::with_weight(vec!["hello".into()], 1));
    }

    #[test]
    fn test_open_reads_concatenated_gzip_members() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.gz");
        let mut file = File::create(&path).unwrap();
        for member in ["a 1\n", "b 2\n"] {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
            encoder.write_all(member.as_bytes()).unwrap();
            file.write_all(&encoder.finish().unwrap()).unwrap();
        }
        drop(file);

        let weights: Vec<u64> = read_all(&path).iter().map(|line| line.weight).collect();
        assert_eq!(weights, vec![1, 2]);
    }

    #[test]
    fn test_open_reads_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        std::fs::write(&path, "ab 3\n").unwrap();
        assert_eq!(read_all(&path), vec![WeightedLine::with_weight(vec!["ab".into()], 3)]);
    }

    #[test]
    fn test_open_missing_file_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let err = open(&dir.path().join("missing.txt")).err().unwrap();
        assert!(err.to_string().starts_with("failed to open"));
    }
}
